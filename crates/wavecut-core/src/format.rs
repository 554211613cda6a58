//! Audio format descriptor shared by every buffer derived from the same source.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, WaveEditError};

/// The (sample rate, channel count) pair that must match for two buffers
/// to be combined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioFormat {
    /// Frames per second.
    pub sample_rate: f64,
    /// Number of non-interleaved channels.
    pub channel_count: u32,
}

impl AudioFormat {
    /// Create a validated format.
    pub fn new(sample_rate: f64, channel_count: u32) -> Result<Self> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(WaveEditError::InvalidParameter(format!(
                "sample rate must be positive, got {sample_rate}"
            )));
        }
        if channel_count == 0 {
            return Err(WaveEditError::InvalidParameter(
                "channel count must be at least 1".into(),
            ));
        }
        Ok(Self {
            sample_rate,
            channel_count,
        })
    }

    /// Mono at the given rate.
    pub fn mono(sample_rate: f64) -> Result<Self> {
        Self::new(sample_rate, 1)
    }

    /// Stereo at the given rate.
    pub fn stereo(sample_rate: f64) -> Result<Self> {
        Self::new(sample_rate, 2)
    }

    /// Fail with `FormatMismatch` unless `other` equals `self`.
    pub fn ensure_matches(&self, other: &AudioFormat) -> Result<()> {
        if self == other {
            Ok(())
        } else {
            Err(WaveEditError::FormatMismatch {
                expected: *self,
                found: *other,
            })
        }
    }

    /// Human-readable channel layout.
    pub fn layout_name(&self) -> String {
        match self.channel_count {
            1 => "Mono".to_string(),
            2 => "Stereo".to_string(),
            n => format!("{n} ch"),
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} kHz {}",
            self.sample_rate / 1000.0,
            self.layout_name()
        )
    }
}
