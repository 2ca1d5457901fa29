use std::time::Duration;

use crate::buttons::{Button, ButtonPanel, Keypad};
use crate::clock::Clock;
use crate::segment::{DigitProbe, SegmentSensor};
use crate::tracker::PositionTracker;

/// Walks the remote left until the display shows the sentinel channel.
pub struct Synchronizer {
    pub probe: DigitProbe,
    pub between_presses: Duration,
}

impl Synchronizer {
    /// One press-and-probe step. Returns true once the position is known.
    pub fn cycle<K: Keypad, S: SegmentSensor, C: Clock>(
        &self,
        tracker: &mut PositionTracker,
        buttons: &mut ButtonPanel<K>,
        sensor: &mut S,
        clock: &mut C,
    ) -> bool {
        if tracker.is_known() {
            return true;
        }

        buttons.press(Button::Left, clock);
        clock.sleep(self.between_presses);

        if self.probe.shows_two(sensor, clock) {
            tracker.anchor_on_sentinel();
            true
        } else {
            false
        }
    }
}
