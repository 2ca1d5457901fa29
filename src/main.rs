mod adc;
mod buttons;
mod clock;
mod command;
mod config;
mod control;
mod link;
mod navigation;
mod remote;
mod segment;
mod synchronizer;
mod tracker;

#[cfg(test)]
mod mock;

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use adc::AdcSegmentSensor;
use buttons::GpioKeypad;
use clock::SystemClock;
use config::{ConfigError, Settings};
use control::ControlLoop;
use link::{Heartbeat, WsLink};
use remote::Remote;

#[derive(Parser)]
#[command(name = "blinds-bridge")]
#[command(about = "Drives a multi-channel blinds remote from text commands over a WebSocket", long_about = None)]
struct Cli {
    /// Settings file, created with defaults when missing
    #[arg(short, long, value_name = "FILE", default_value = "blinds.json")]
    config: PathBuf,

    /// WebSocket URL to take commands from, overriding the settings file
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    match Settings::load(path) {
        Ok(settings) => {
            log::info!("Loaded settings from {}", path.display());
            Ok(settings)
        }
        Err(ConfigError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("No settings at {}, writing defaults", path.display());
            let settings = Settings::default();
            settings.save(path)?;
            Ok(settings)
        }
        Err(e) => Err(e).with_context(|| format!("loading {}", path.display())),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    log::info!("Starting blinds bridge");

    let mut settings = load_settings(&cli.config)?;
    if let Some(url) = cli.url {
        settings.link.url = url;
    }

    let keypad = GpioKeypad::new(&settings.pins).context("setting up button outputs")?;
    let sensor = AdcSegmentSensor::new(&settings.sensor).context("setting up display sensor")?;
    let remote = Remote::new(keypad, sensor, SystemClock::new(), &settings);

    let link = WsLink::new(&settings.link);
    let heartbeat = Heartbeat::new(Duration::from_millis(settings.link.heartbeat_ms));

    log::info!(
        "Channels 1..={}, synchronizing on {}",
        settings.max_channel,
        tracker::SENTINEL_CHANNEL
    );
    ControlLoop::new(remote, link, heartbeat).run()
}
