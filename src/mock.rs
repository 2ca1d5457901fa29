//! Stand-ins for the remote, the sensor, the clock and the link.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use crate::buttons::{Button, Keypad};
use crate::clock::Clock;
use crate::link::{CommandLink, LinkError};
use crate::navigation::{step, Direction};
use crate::segment::{SegmentSensor, SensorError};
use crate::tracker::{Channel, SENTINEL_CHANNEL};

/// Virtual time that only moves when slept.
pub struct MockClock {
    now: Duration,
}

impl MockClock {
    pub fn new() -> Self {
        MockClock { now: Duration::ZERO }
    }
}

impl Clock for MockClock {
    fn now(&self) -> Duration {
        self.now
    }

    fn sleep(&mut self, duration: Duration) {
        self.now += duration;
    }
}

pub struct RecordingKeypad {
    events: RefCell<Vec<(Button, bool)>>,
}

impl RecordingKeypad {
    pub fn new() -> Self {
        RecordingKeypad { events: RefCell::new(Vec::new()) }
    }

    pub fn events(&self) -> Vec<(Button, bool)> {
        self.events.borrow().clone()
    }

    /// Buttons in the order they went down.
    pub fn pressed(&self) -> Vec<Button> {
        self.events
            .borrow()
            .iter()
            .filter(|(_, pressed)| *pressed)
            .map(|(button, _)| *button)
            .collect()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl Keypad for RecordingKeypad {
    fn set_pressed(&mut self, button: Button, pressed: bool) {
        self.events.borrow_mut().push((button, pressed));
    }
}

pub struct ScriptedSensor {
    script: VecDeque<Result<u16, SensorError>>,
    fallback: u16,
    reads: usize,
}

impl ScriptedSensor {
    pub fn new(script: Vec<Result<u16, SensorError>>, fallback: u16) -> Self {
        ScriptedSensor { script: script.into(), fallback, reads: 0 }
    }

    pub fn constant(millivolts: u16) -> Self {
        ScriptedSensor::new(Vec::new(), millivolts)
    }

    pub fn reads(&self) -> usize {
        self.reads
    }
}

impl SegmentSensor for ScriptedSensor {
    fn read_millivolts(&mut self) -> Result<u16, SensorError> {
        self.reads += 1;
        self.script.pop_front().unwrap_or(Ok(self.fallback))
    }
}

/// A remote whose selector follows left/right presses and whose display
/// segment reads dark only on the sentinel channel.
#[derive(Clone)]
pub struct SimulatedRemote {
    channel: Rc<Cell<Channel>>,
    channels: Channel,
}

impl SimulatedRemote {
    pub fn new(channel: Channel, channels: Channel) -> Self {
        SimulatedRemote { channel: Rc::new(Cell::new(channel)), channels }
    }

    pub fn channel(&self) -> Channel {
        self.channel.get()
    }

    pub fn keypad(&self) -> SimulatedKeypad {
        SimulatedKeypad { remote: self.clone() }
    }

    pub fn sensor(&self) -> SimulatedSensor {
        SimulatedSensor { remote: self.clone() }
    }
}

pub struct SimulatedKeypad {
    remote: SimulatedRemote,
}

impl Keypad for SimulatedKeypad {
    fn set_pressed(&mut self, button: Button, pressed: bool) {
        let direction = match button {
            Button::Left => Direction::Left,
            Button::Right => Direction::Right,
            _ => return,
        };
        if pressed {
            let r = &self.remote;
            r.channel.set(step(r.channel.get(), direction, r.channels));
        }
    }
}

pub struct SimulatedSensor {
    remote: SimulatedRemote,
}

impl SegmentSensor for SimulatedSensor {
    fn read_millivolts(&mut self) -> Result<u16, SensorError> {
        if self.remote.channel() == SENTINEL_CHANNEL {
            Ok(2600)
        } else {
            Ok(400)
        }
    }
}

pub struct MockLink {
    connected: bool,
    inbound: VecDeque<Vec<u8>>,
    published: Vec<String>,
}

impl MockLink {
    pub fn connected() -> Self {
        MockLink { connected: true, inbound: VecDeque::new(), published: Vec::new() }
    }

    pub fn push(&mut self, payload: &str) {
        self.inbound.push_back(payload.as_bytes().to_vec());
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    pub fn published(&self) -> Vec<String> {
        self.published.clone()
    }
}

impl CommandLink for MockLink {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn receive(&mut self) -> Option<Vec<u8>> {
        if !self.connected {
            return None;
        }
        self.inbound.pop_front()
    }

    fn publish(&mut self, payload: &str) -> Result<(), LinkError> {
        if !self.connected {
            return Err(LinkError::NotConnected);
        }
        self.published.push(payload.to_string());
        Ok(())
    }
}
