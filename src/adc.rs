use rppal::spi::{Bus, Mode, SlaveSelect, Spi};

use crate::config::SensorSettings;
use crate::segment::{SegmentSensor, SensorError};

const ADC_MAX: u32 = 1023;

/// MCP3008 on SPI0.0 reading the voltage across one display segment.
pub struct AdcSegmentSensor {
    spi: Spi,
    channel: u8,
    vref_mv: u16,
}

impl AdcSegmentSensor {
    pub fn new(settings: &SensorSettings) -> Result<Self, rppal::spi::Error> {
        let spi = Spi::new(Bus::Spi0, SlaveSelect::Ss0, 1_000_000, Mode::Mode0)?;
        log::info!("MCP3008 ADC initialized on SPI0.0, sampling channel {}", settings.adc_channel);
        Ok(AdcSegmentSensor {
            spi,
            channel: settings.adc_channel,
            vref_mv: settings.vref_mv,
        })
    }

    fn read_raw(&mut self) -> Result<u16, rppal::spi::Error> {
        let tx_buffer = [
            0x01,
            (0x08 | self.channel) << 4,
            0x00,
        ];
        let mut rx_buffer = [0u8; 3];

        self.spi.transfer(&mut rx_buffer, &tx_buffer)?;

        Ok((((rx_buffer[1] & 0x03) as u16) << 8) | (rx_buffer[2] as u16))
    }
}

impl SegmentSensor for AdcSegmentSensor {
    fn read_millivolts(&mut self) -> Result<u16, SensorError> {
        let raw = self.read_raw().map_err(|e| SensorError::Read(e.to_string()))?;
        Ok(raw_to_millivolts(raw, self.vref_mv))
    }
}

fn raw_to_millivolts(raw: u16, vref_mv: u16) -> u16 {
    ((raw as u32).min(ADC_MAX) * vref_mv as u32 / ADC_MAX) as u16
}
