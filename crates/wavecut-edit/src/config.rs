//! Editor configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use wavecut_audio::CompressionStrategy;
use wavecut_core::{Result, WaveEditError};

/// Tunables for an `EditEngine`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum number of retained undo (and redo) entries.
    pub undo_depth: usize,
    /// How envelopes are downsampled.
    pub compression: CompressionStrategy,
    /// Cursor step for `forward` / `backward`, in seconds.
    pub seek_step_secs: f64,
    /// Rate at which the background worker reports the play head.
    pub playback_poll_hz: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            undo_depth: 10,
            compression: CompressionStrategy::default(),
            seek_step_secs: 15.0,
            playback_poll_hz: 40.0,
        }
    }
}

impl EditorConfig {
    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.undo_depth == 0 {
            return Err(WaveEditError::InvalidParameter(
                "undo_depth must be at least 1".into(),
            ));
        }
        if !self.compression.is_valid() {
            return Err(WaveEditError::InvalidParameter(format!(
                "invalid compression strategy {:?}",
                self.compression
            )));
        }
        if !(self.seek_step_secs > 0.0 && self.seek_step_secs.is_finite()) {
            return Err(WaveEditError::InvalidParameter(format!(
                "seek_step_secs must be positive, got {}",
                self.seek_step_secs
            )));
        }
        if !(self.playback_poll_hz > 0.0 && self.playback_poll_hz.is_finite()) {
            return Err(WaveEditError::InvalidParameter(format!(
                "playback_poll_hz must be positive, got {}",
                self.playback_poll_hz
            )));
        }
        Ok(())
    }

    /// Parse and validate a JSON document. Missing fields take defaults.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let config: Self = serde_json::from_slice(data)
            .map_err(|e| WaveEditError::InvalidParameter(format!("invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_json(&data)
    }

    /// Poll interval derived from `playback_poll_hz`.
    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / self.playback_poll_hz)
    }
}
