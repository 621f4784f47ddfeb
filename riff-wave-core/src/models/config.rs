use serde::{Deserialize, Serialize};

use super::error::WavError;
use super::format::{HeaderFormat, MappingFamily, SampleFormat, WavFormatDescriptor};

/// Highest channel count an Opus channel mapping can describe.
pub const MAX_CHANNELS: u16 = 255;

/// Output settings for one WAV stream.
///
/// Missing JSON fields fall back to [`Default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WavOutputConfig {
    /// Output sample rate in Hz (default: 48000).
    pub sample_rate: u32,

    /// Number of interleaved channels (default: 2).
    pub channels: u16,

    /// Channel mapping family of the decoded stream (default: 0).
    pub mapping_family: MappingFamily,

    /// Sample encoding (default: 16-bit integer).
    pub sample_format: SampleFormat,

    /// Write headerless PCM instead of a WAV file (default: false).
    pub raw: bool,
}

impl WavOutputConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate == 0 {
            return Err("sample rate must be positive".into());
        }
        if self.channels == 0 || self.channels > MAX_CHANNELS {
            return Err(format!("unsupported channel count: {}", self.channels));
        }
        let bytes_per_sample = self.sample_format.bytes_per_sample() as u32;
        let byte_rate = bytes_per_sample
            .checked_mul(self.channels as u32)
            .and_then(|frame| frame.checked_mul(self.sample_rate));
        if byte_rate.is_none() {
            return Err(format!(
                "byte rate overflows 32 bits: {} Hz x {} channels",
                self.sample_rate, self.channels
            ));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, WavError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| WavError::InvalidConfiguration(format!("failed to parse config: {}", e)))?;
        config.validate().map_err(WavError::InvalidConfiguration)?;
        Ok(config)
    }

    pub fn descriptor(&self) -> WavFormatDescriptor {
        WavFormatDescriptor::new(self.sample_rate, self.channels, self.mapping_family, self.sample_format)
    }

    /// The header this configuration produces, `Raw` when no header is written.
    pub fn header_format(&self) -> HeaderFormat {
        if self.raw {
            HeaderFormat::Raw
        } else {
            self.descriptor().header_format()
        }
    }
}

impl Default for WavOutputConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            channels: 2,
            mapping_family: MappingFamily::UNMAPPED,
            sample_format: SampleFormat::Int16,
            raw: false,
        }
    }
}
