use rppal::gpio::{Gpio, OutputPin};
use std::time::Duration;

use crate::clock::Clock;
use crate::config::{ButtonPins, TimingSettings};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Left,
    Right,
    Up,
    Down,
    Mid,
}

/// Outputs wired across the remote's button contacts.
pub trait Keypad {
    fn set_pressed(&mut self, button: Button, pressed: bool);
}

pub struct GpioKeypad {
    left: OutputPin,
    right: OutputPin,
    up: OutputPin,
    down: OutputPin,
    mid: OutputPin,
}

impl GpioKeypad {
    pub fn new(pins: &ButtonPins) -> Result<Self, rppal::gpio::Error> {
        let gpio = Gpio::new()?;
        let output = |pin_num: u8| -> Result<OutputPin, rppal::gpio::Error> {
            let pin = gpio.get(pin_num)?.into_output_low();
            log::debug!("GPIO {} initialized as button output", pin_num);
            Ok(pin)
        };

        Ok(GpioKeypad {
            left: output(pins.left)?,
            right: output(pins.right)?,
            up: output(pins.up)?,
            down: output(pins.down)?,
            mid: output(pins.mid)?,
        })
    }

    fn pin(&mut self, button: Button) -> &mut OutputPin {
        match button {
            Button::Left => &mut self.left,
            Button::Right => &mut self.right,
            Button::Up => &mut self.up,
            Button::Down => &mut self.down,
            Button::Mid => &mut self.mid,
        }
    }
}

impl Keypad for GpioKeypad {
    fn set_pressed(&mut self, button: Button, pressed: bool) {
        let pin = self.pin(button);
        if pressed {
            pin.set_high();
        } else {
            pin.set_low();
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PressTiming {
    pub remote_inactive: Duration,
    pub waking: Duration,
    pub normal: Duration,
}

impl From<&TimingSettings> for PressTiming {
    fn from(t: &TimingSettings) -> Self {
        PressTiming {
            remote_inactive: Duration::from_millis(t.remote_inactive_ms),
            waking: Duration::from_millis(t.waking_press_ms),
            normal: Duration::from_millis(t.normal_press_ms),
        }
    }
}

/// Emulates presses on the remote.
///
/// A remote left alone goes to sleep and needs a longer press to wake up, so
/// the hold time depends on how long ago the previous press started.
pub struct ButtonPanel<K> {
    keypad: K,
    timing: PressTiming,
    last_press: Option<Duration>,
}

impl<K: Keypad> ButtonPanel<K> {
    pub fn new(keypad: K, timing: PressTiming) -> Self {
        ButtonPanel { keypad, timing, last_press: None }
    }

    #[cfg(test)]
    pub fn keypad(&self) -> &K {
        &self.keypad
    }

    /// Press and release one button. Returns how long it was held.
    pub fn press<C: Clock>(&mut self, button: Button, clock: &mut C) -> Duration {
        let hold = self.adaptive_hold(clock.now());
        self.keypad.set_pressed(button, true);
        clock.sleep(hold);
        self.keypad.set_pressed(button, false);
        log::trace!("Pressed {:?} for {:?}", button, hold);
        hold
    }

    /// Hold two buttons together for an explicit duration.
    pub fn press_pair<C: Clock>(
        &mut self,
        first: Button,
        second: Button,
        hold: Duration,
        clock: &mut C,
    ) {
        self.last_press = Some(clock.now());
        self.keypad.set_pressed(first, true);
        self.keypad.set_pressed(second, true);
        clock.sleep(hold);
        self.keypad.set_pressed(first, false);
        self.keypad.set_pressed(second, false);
        log::trace!("Pressed {:?}+{:?} for {:?}", first, second, hold);
    }

    fn adaptive_hold(&mut self, now: Duration) -> Duration {
        let waking = match self.last_press {
            Some(last) => now.saturating_sub(last) > self.timing.remote_inactive,
            None => true,
        };
        self.last_press = Some(now);
        if waking {
            self.timing.waking
        } else {
            self.timing.normal
        }
    }
}
