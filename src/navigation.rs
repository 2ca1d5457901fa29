//! Moving the remote's channel selector.
//!
//! The selector wraps around: pressing right on the last channel lands on 1
//! and pressing left on 1 lands on the last channel. Routes always take the
//! shorter way round.

use std::time::Duration;

use crate::buttons::{Button, ButtonPanel, Keypad};
use crate::clock::Clock;
use crate::tracker::{Channel, PositionTracker};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    pub fn button(self) -> Button {
        match self {
            Direction::Left => Button::Left,
            Direction::Right => Button::Right,
        }
    }
}

/// Signed number of presses from `current` to `target`, positive meaning
/// right. When the two ways round are equally long the raw difference wins.
pub fn displacement(current: Channel, target: Channel, channels: Channel) -> i32 {
    let n = channels as i32;
    let d = target as i32 - current as i32;
    if d.abs() > n / 2 {
        if d > 0 { d - n } else { d + n }
    } else {
        d
    }
}

/// Channel reached by one press from `channel`.
pub fn step(channel: Channel, direction: Direction, channels: Channel) -> Channel {
    match direction {
        Direction::Right if channel >= channels => 1,
        Direction::Right => channel + 1,
        Direction::Left if channel <= 1 => channels,
        Direction::Left => channel - 1,
    }
}

pub struct Navigator {
    pub between_presses: Duration,
}

impl Navigator {
    /// Presses towards `target`, recording the new channel after every press
    /// so a failure part way leaves the tracker at most one channel off.
    ///
    /// Returns the tracked channel as read back after each press, ending with
    /// `target`. Does nothing when the position is unknown.
    pub fn travel<K: Keypad, C: Clock>(
        &self,
        tracker: &mut PositionTracker,
        buttons: &mut ButtonPanel<K>,
        clock: &mut C,
        target: Channel,
    ) -> Vec<Channel> {
        let Some(mut current) = tracker.current() else {
            return Vec::new();
        };
        let channels = tracker.max_channel();

        let d = displacement(current, target, channels);
        let direction = if d > 0 { Direction::Right } else { Direction::Left };
        let presses = d.unsigned_abs() as usize;
        if presses > 0 {
            log::debug!("Navigating {} -> {}: {} x {:?}", current, target, presses, direction);
        }

        let mut visited = Vec::with_capacity(presses);
        for i in 0..presses {
            if i > 0 {
                clock.sleep(self.between_presses);
            }
            buttons.press(direction.button(), clock);
            current = step(current, direction, channels);
            tracker.moved_to(current);
            if let Some(tracked) = tracker.current() {
                visited.push(tracked);
            }
        }
        visited
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buttons::PressTiming;
    use crate::config::TimingSettings;
    use crate::mock::{MockClock, RecordingKeypad};

    fn known_at(channel: Channel, channels: Channel) -> PositionTracker {
        let mut tracker = PositionTracker::new(channels);
        tracker.anchor_on_sentinel();
        if channel != 22 {
            tracker.moved_to(channel);
        }
        tracker
    }

    fn navigator() -> Navigator {
        Navigator { between_presses: Duration::from_millis(35) }
    }

    fn panel() -> ButtonPanel<RecordingKeypad> {
        ButtonPanel::new(RecordingKeypad::new(), PressTiming::from(&TimingSettings::default()))
    }

    #[test]
    fn displacement_is_congruent_and_minimal() {
        for n in 1..=99u8 {
            for c in 1..=n {
                for t in 1..=n {
                    let d = displacement(c, t, n);
                    let n = n as i32;
                    let raw = t as i32 - c as i32;
                    assert_eq!((d - raw).rem_euclid(n), 0, "n={} c={} t={}", n, c, t);
                    assert!(d.abs() <= n / 2, "n={} c={} t={} d={}", n, c, t, d);
                }
            }
        }
    }

    #[test]
    fn wraps_forward_past_the_last_channel() {
        assert_eq!(displacement(95, 3, 99), 7);
        assert_eq!(displacement(3, 95, 99), -7);
        assert_eq!(displacement(10, 10, 99), 0);
        assert_eq!(displacement(1, 50, 99), 49);
        assert_eq!(displacement(1, 51, 99), -49);
    }

    #[test]
    fn half_way_keeps_raw_direction() {
        assert_eq!(displacement(1, 6, 10), 5);
        assert_eq!(displacement(6, 1, 10), -5);
    }

    #[test]
    fn step_wraps_both_ends() {
        assert_eq!(step(99, Direction::Right, 99), 1);
        assert_eq!(step(1, Direction::Left, 99), 99);
        assert_eq!(step(40, Direction::Left, 99), 39);
    }

    #[test]
    fn travel_across_the_wrap() {
        let mut tracker = known_at(95, 99);
        let mut buttons = panel();
        let mut clock = MockClock::new();

        let visited = navigator().travel(&mut tracker, &mut buttons, &mut clock, 3);

        assert_eq!(visited, vec![96, 97, 98, 99, 1, 2, 3]);
        assert_eq!(tracker.current(), Some(3));
        assert_eq!(buttons.keypad().pressed(), vec![Button::Right; 7]);
        // one waking press, six normal ones, six gaps
        assert_eq!(clock.now(), Duration::from_millis(75 + 6 * 25 + 6 * 35));
    }

    #[test]
    fn tracker_follows_every_press() {
        for (start, target) in [(95, 3), (3, 95), (22, 71), (71, 22), (1, 50)] {
            let mut tracker = known_at(start, 99);
            let mut buttons = panel();
            let mut clock = MockClock::new();

            let seen = navigator().travel(&mut tracker, &mut buttons, &mut clock, target);

            let d = displacement(start, target, 99);
            let direction = if d > 0 { Direction::Right } else { Direction::Left };
            assert_eq!(seen.len(), d.unsigned_abs() as usize);
            assert_eq!(buttons.keypad().pressed().len(), seen.len());

            let mut previous = start;
            for &channel in &seen {
                let expected = step(previous, direction, 99);
                assert_eq!(channel, expected, "{} -> {}: {:?}", start, target, seen);
                previous = channel;
            }
            assert_eq!(previous, target);
            assert_eq!(tracker.current(), Some(target));
        }
    }

    #[test]
    fn travel_left_visits_each_channel_once() {
        let mut tracker = known_at(30, 99);
        let mut buttons = panel();
        let mut clock = MockClock::new();

        let visited = navigator().travel(&mut tracker, &mut buttons, &mut clock, 26);

        assert_eq!(visited, vec![29, 28, 27, 26]);
        assert_eq!(buttons.keypad().pressed(), vec![Button::Left; 4]);
    }

    #[test]
    fn travel_to_current_channel_presses_nothing() {
        let mut tracker = known_at(10, 99);
        let mut buttons = panel();
        let mut clock = MockClock::new();

        assert!(navigator().travel(&mut tracker, &mut buttons, &mut clock, 10).is_empty());
        assert!(buttons.keypad().events().is_empty());
        assert_eq!(clock.now(), Duration::ZERO);
    }

    #[test]
    fn travel_from_unknown_is_a_no_op() {
        let mut tracker = PositionTracker::new(99);
        let mut buttons = panel();
        let mut clock = MockClock::new();

        assert!(navigator().travel(&mut tracker, &mut buttons, &mut clock, 10).is_empty());
        assert!(!tracker.is_known());
        assert!(buttons.keypad().events().is_empty());
    }
}
