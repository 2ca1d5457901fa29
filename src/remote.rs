use std::time::Duration;

use crate::buttons::{Button, ButtonPanel, Keypad, PressTiming};
use crate::clock::Clock;
use crate::command::{Action, Command};
use crate::config::Settings;
use crate::navigation::Navigator;
use crate::segment::{DigitProbe, SegmentSensor};
use crate::synchronizer::Synchronizer;
use crate::tracker::{Channel, Position, PositionTracker};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ignored,
    /// Position unknown; channel commands wait for synchronization.
    Deferred,
    Executed { action: Action, channel: Channel, presses: usize },
    Resynchronized,
}

/// Everything the bridge knows about and drives on the physical remote.
pub struct Remote<K, S, C> {
    buttons: ButtonPanel<K>,
    sensor: S,
    clock: C,
    tracker: PositionTracker,
    navigator: Navigator,
    synchronizer: Synchronizer,
    after_command: Duration,
    program_press: Duration,
}

impl<K: Keypad, S: SegmentSensor, C: Clock> Remote<K, S, C> {
    pub fn new(keypad: K, sensor: S, clock: C, settings: &Settings) -> Self {
        let timing = &settings.timing;
        Remote {
            buttons: ButtonPanel::new(keypad, PressTiming::from(timing)),
            sensor,
            clock,
            tracker: PositionTracker::new(settings.max_channel),
            navigator: Navigator { between_presses: timing.between_presses() },
            synchronizer: Synchronizer {
                probe: DigitProbe::from(&settings.sensor),
                between_presses: timing.between_presses(),
            },
            after_command: timing.after_command(),
            program_press: timing.program_press(),
        }
    }

    pub fn position(&self) -> Position {
        self.tracker.position()
    }

    pub fn is_known(&self) -> bool {
        self.tracker.is_known()
    }

    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    #[cfg(test)]
    pub fn keypad(&self) -> &K {
        self.buttons.keypad()
    }

    #[cfg(test)]
    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// One synchronization step; see [`Synchronizer::cycle`].
    pub fn synchronize(&mut self) -> bool {
        self.synchronizer.cycle(
            &mut self.tracker,
            &mut self.buttons,
            &mut self.sensor,
            &mut self.clock,
        )
    }

    pub fn dispatch(&mut self, payload: &[u8]) -> Outcome {
        match Command::parse(payload, self.tracker.max_channel()) {
            Ok(command) => self.execute(command),
            Err(e) => {
                log::debug!("Ignoring command: {}", e);
                Outcome::Ignored
            }
        }
    }

    pub fn execute(&mut self, command: Command) -> Outcome {
        match command {
            Command::Resync => {
                self.tracker.forget();
                Outcome::Resynchronized
            }
            Command::PerChannel { action, channel } => {
                if !self.tracker.is_known() {
                    log::debug!("Position unknown, dropping {:?} for channel {}", action, channel);
                    return Outcome::Deferred;
                }

                let visited = self.navigator.travel(
                    &mut self.tracker,
                    &mut self.buttons,
                    &mut self.clock,
                    channel,
                );
                if !visited.is_empty() {
                    self.clock.sleep(self.navigator.between_presses);
                }
                self.perform(action);
                log::info!(
                    "{:?} on channel {} ({} navigation presses)",
                    action,
                    channel,
                    visited.len()
                );

                Outcome::Executed { action, channel, presses: visited.len() }
            }
        }
    }

    fn perform(&mut self, action: Action) {
        match action {
            Action::Raise => {
                self.buttons.press(Button::Up, &mut self.clock);
            }
            Action::Lower => {
                self.buttons.press(Button::Down, &mut self.clock);
            }
            Action::Stop => {
                self.buttons.press(Button::Mid, &mut self.clock);
            }
            Action::Program => {
                let hold = self.program_press;
                self.buttons.press_pair(Button::Mid, Button::Up, hold, &mut self.clock);
            }
            Action::Nop => return,
        }
        self.clock.sleep(self.after_command);
    }
}
