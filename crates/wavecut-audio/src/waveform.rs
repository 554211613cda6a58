//! Waveform envelope computation for display and level metering.
//!
//! The envelope is the absolute value of channel 0, box-filtered and
//! decimated by the compression factor. It is recomputed in full whenever
//! the buffer it was derived from is replaced.

use serde::{Deserialize, Serialize};
use wavecut_core::{SampleBuffer, TimeRange};

/// Noise floor for `power_at`, in dB.
pub const MIN_DB: f32 = -80.0;

/// How the compression factor is chosen for a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CompressionStrategy {
    /// A fixed number of input frames per envelope point.
    FixedRatio(usize),
    /// Roughly this many envelope points per second of audio.
    PerSecond(f64),
    /// Roughly this many envelope points for the whole buffer.
    TargetPoints(usize),
}

impl Default for CompressionStrategy {
    fn default() -> Self {
        Self::PerSecond(10.0)
    }
}

impl CompressionStrategy {
    /// Resolve to a compression factor (always at least 1).
    pub fn factor_for(&self, frames: usize, sample_rate: f64) -> usize {
        let factor = match *self {
            Self::FixedRatio(ratio) => ratio,
            Self::PerSecond(points) if points > 0.0 && points.is_finite() => {
                (sample_rate / points) as usize
            }
            Self::PerSecond(_) => frames,
            Self::TargetPoints(points) if points > 0 => frames / points,
            Self::TargetPoints(_) => frames,
        };
        factor.max(1)
    }

    /// True when every parameter is usable.
    pub fn is_valid(&self) -> bool {
        match *self {
            Self::FixedRatio(ratio) => ratio > 0,
            Self::PerSecond(points) => points > 0.0 && points.is_finite(),
            Self::TargetPoints(points) => points > 0,
        }
    }
}

/// Downsampled absolute-amplitude summary of a buffer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaveformEnvelope {
    /// Envelope points per second of audio.
    pub sample_rate: f64,
    /// Input frames folded into each point.
    pub compression: usize,
    /// Mean absolute amplitude per point.
    pub amplitudes: Vec<f32>,
}

impl WaveformEnvelope {
    /// Envelope of an empty document.
    pub fn empty() -> Self {
        Self {
            sample_rate: 0.0,
            compression: 1,
            amplitudes: Vec::new(),
        }
    }

    /// Compute the envelope of `buffer` with an explicit compression factor.
    ///
    /// Output length is `floor(len_frames / compression)`; trailing frames
    /// that do not fill a whole window are dropped.
    pub fn summarize(buffer: &SampleBuffer, compression: usize) -> Self {
        let compression = compression.max(1);
        let Some(samples) = buffer.channel(0) else {
            return Self::empty();
        };
        let scale = 1.0 / compression as f32;
        let amplitudes: Vec<f32> = samples
            .chunks_exact(compression)
            .map(|window| window.iter().map(|s| s.abs()).sum::<f32>() * scale)
            .collect();

        let duration = buffer.duration_secs();
        let sample_rate = if duration > 0.0 {
            amplitudes.len() as f64 / duration
        } else {
            0.0
        };

        Self {
            sample_rate,
            compression,
            amplitudes,
        }
    }

    /// Compute the envelope choosing the factor from `strategy`.
    pub fn summarize_with(buffer: &SampleBuffer, strategy: CompressionStrategy) -> Self {
        let factor = strategy.factor_for(buffer.len_frames(), buffer.sample_rate());
        Self::summarize(buffer, factor)
    }

    /// Number of envelope points.
    pub fn len(&self) -> usize {
        self.amplitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amplitudes.is_empty()
    }

    /// Envelope index covering `time`, if populated.
    pub fn index_at(&self, time: f64) -> Option<usize> {
        if !time.is_finite() || time < 0.0 || self.sample_rate <= 0.0 {
            return None;
        }
        let index = (time * self.sample_rate).floor() as usize;
        (index < self.amplitudes.len()).then_some(index)
    }

    /// Perceptual level at `time` in `[0, 1]`; silence outside the envelope.
    pub fn power_at(&self, time: f64) -> f32 {
        match self.index_at(time) {
            Some(index) => scaled_power(amplitude_to_db(self.amplitudes[index])),
            None => 0.0,
        }
    }

    /// RMS of the envelope points that fall inside `range`.
    pub fn rms_between(&self, range: TimeRange) -> f32 {
        if self.sample_rate <= 0.0 {
            return 0.0;
        }
        let start = ((range.start.max(0.0) * self.sample_rate) as usize).min(self.len());
        let end = ((range.end.max(0.0) * self.sample_rate).ceil() as usize).min(self.len());
        if start >= end {
            return 0.0;
        }

        let sum: f64 = self.amplitudes[start..end]
            .iter()
            .map(|&a| (a as f64) * (a as f64))
            .sum();
        (sum / (end - start) as f64).sqrt() as f32
    }

    /// Highest point in the envelope.
    pub fn peak(&self) -> f32 {
        self.amplitudes.iter().copied().fold(0.0, f32::max)
    }
}

/// Amplitude to decibels (`20 * log10`).
#[inline]
pub fn amplitude_to_db(amplitude: f32) -> f32 {
    20.0 * amplitude.log10()
}

/// Map dB to `[0, 1]`: below the floor is 0, at or above 0 dB is 1,
/// linear in between. Non-finite input is silence.
pub fn scaled_power(db: f32) -> f32 {
    if !db.is_finite() {
        if db == f32::INFINITY {
            return 1.0;
        }
        return 0.0;
    }
    if db < MIN_DB {
        0.0
    } else if db >= 0.0 {
        1.0
    } else {
        (db - MIN_DB) / -MIN_DB
    }
}
