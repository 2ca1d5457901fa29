use serde::{Serialize, Deserialize};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use crate::tracker::{Channel, SENTINEL_CHANNEL};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("settings file: {0}")]
    Io(#[from] io::Error),
    #[error("settings format: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// BCM pin numbers wired to the remote's buttons.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonPins {
    pub left: u8,
    pub right: u8,
    pub up: u8,
    pub down: u8,
    pub mid: u8,
}

impl Default for ButtonPins {
    fn default() -> Self {
        ButtonPins { left: 17, right: 27, up: 22, down: 23, mid: 24 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorSettings {
    pub adc_channel: u8,
    pub vref_mv: u16,
    pub inactive_threshold_mv: u16,
    pub probe_window_ms: u64,
    pub sample_interval_ms: u64,
}

impl Default for SensorSettings {
    fn default() -> Self {
        SensorSettings {
            adc_channel: 0,
            vref_mv: 3300,
            inactive_threshold_mv: 2000,
            probe_window_ms: 50,
            sample_interval_ms: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingSettings {
    pub remote_inactive_ms: u64,
    pub waking_press_ms: u64,
    pub normal_press_ms: u64,
    pub program_press_ms: u64,
    pub between_presses_ms: u64,
    pub after_command_ms: u64,
}

impl Default for TimingSettings {
    fn default() -> Self {
        TimingSettings {
            remote_inactive_ms: 1000,
            waking_press_ms: 75,
            normal_press_ms: 25,
            program_press_ms: 1000,
            between_presses_ms: 35,
            after_command_ms: 1500,
        }
    }
}

impl TimingSettings {
    pub fn between_presses(&self) -> Duration {
        Duration::from_millis(self.between_presses_ms)
    }

    pub fn after_command(&self) -> Duration {
        Duration::from_millis(self.after_command_ms)
    }

    pub fn program_press(&self) -> Duration {
        Duration::from_millis(self.program_press_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkSettings {
    pub url: String,
    pub heartbeat_ms: u64,
    pub reconnect_secs: u64,
    /// Bound on the TCP connect and on the WebSocket handshake.
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
}

impl Default for LinkSettings {
    fn default() -> Self {
        LinkSettings {
            url: String::from("ws://127.0.0.1:10013"),
            heartbeat_ms: 1000,
            reconnect_secs: 5,
            connect_timeout_ms: 2000,
            read_timeout_ms: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub max_channel: Channel,
    pub pins: ButtonPins,
    pub sensor: SensorSettings,
    pub timing: TimingSettings,
    pub link: LinkSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            max_channel: 99,
            pins: ButtonPins::default(),
            sensor: SensorSettings::default(),
            timing: TimingSettings::default(),
            link: LinkSettings::default(),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_channel < SENTINEL_CHANNEL {
            return Err(ConfigError::Invalid(format!(
                "max_channel {} cannot reach sentinel channel {}",
                self.max_channel, SENTINEL_CHANNEL
            )));
        }
        if self.sensor.adc_channel >= 8 {
            return Err(ConfigError::Invalid(format!(
                "adc_channel {} must be 0-7",
                self.sensor.adc_channel
            )));
        }
        if self.sensor.sample_interval_ms == 0 || self.sensor.probe_window_ms == 0 {
            return Err(ConfigError::Invalid(
                "probe window and sample interval must be non-zero".into(),
            ));
        }

        let p = self.pins;
        let mut pins = [p.left, p.right, p.up, p.down, p.mid];
        pins.sort_unstable();
        if pins.windows(2).any(|w| w[0] == w[1]) {
            return Err(ConfigError::Invalid(format!("button pins must be distinct: {:?}", p)));
        }
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = fs::File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Settings, ConfigError> {
        let content = fs::read_to_string(path)?;
        let loaded: Settings = serde_json::from_str(&content)?;
        loaded.validate()?;
        Ok(loaded)
    }
}
