use std::time::Duration;

use crate::clock::Clock;
use crate::config::SensorSettings;

#[derive(Debug, thiserror::Error)]
pub enum SensorError {
    #[error("segment sensor read failed: {0}")]
    Read(String),
}

/// Analog view of one segment of the remote's leftmost digit.
///
/// A lit segment pulls the voltage down, so a dark segment reads high.
pub trait SegmentSensor {
    fn read_millivolts(&mut self) -> Result<u16, SensorError>;
}

/// Decides whether the leftmost digit currently shows a "2".
#[derive(Debug, Clone, Copy)]
pub struct DigitProbe {
    pub inactive_threshold_mv: u16,
    pub window: Duration,
    pub sample_interval: Duration,
}

impl From<&SensorSettings> for DigitProbe {
    fn from(s: &SensorSettings) -> Self {
        DigitProbe {
            inactive_threshold_mv: s.inactive_threshold_mv,
            window: Duration::from_millis(s.probe_window_ms),
            sample_interval: Duration::from_millis(s.sample_interval_ms),
        }
    }
}

impl DigitProbe {
    /// Samples for the whole window and gives up on the first lit reading.
    pub fn shows_two<S: SegmentSensor, C: Clock>(&self, sensor: &mut S, clock: &mut C) -> bool {
        let start = clock.now();
        loop {
            match sensor.read_millivolts() {
                Ok(mv) if mv < self.inactive_threshold_mv => {
                    log::trace!("Segment lit ({} mV), not a 2", mv);
                    return false;
                }
                Ok(_) => {}
                Err(e) => {
                    log::warn!("{}", e);
                    return false;
                }
            }

            if clock.now().saturating_sub(start) >= self.window {
                return true;
            }
            clock.sleep(self.sample_interval);
        }
    }
}
