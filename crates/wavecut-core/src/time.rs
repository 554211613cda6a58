//! Time ranges and seconds/frame conversion.
//!
//! Every conversion from seconds to a frame index truncates toward zero,
//! and every frame range is half-open: `[start, end)`. Frame 0 is an
//! ordinary frame. Edit commands carry frame positions so that undo and
//! redo never round a second time.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, WaveEditError};

/// Convert seconds to a frame index (truncation, negative times map to 0).
#[inline]
pub fn seconds_to_frame(seconds: f64, sample_rate: f64) -> usize {
    if !seconds.is_finite() || seconds <= 0.0 {
        return 0;
    }
    (seconds * sample_rate) as usize
}

/// Convert a frame index to seconds.
#[inline]
pub fn frame_to_seconds(frame: usize, sample_rate: f64) -> f64 {
    frame as f64 / sample_rate
}

/// Format seconds as `mm:ss`.
pub fn format_mmss(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// A half-open range of frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameSpan {
    /// First frame (inclusive).
    pub start: usize,
    /// End frame (exclusive).
    pub end: usize,
}

impl FrameSpan {
    #[inline]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of frames covered.
    #[inline]
    pub fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.end <= self.start
    }
}

/// A time range in seconds, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    /// Start time in seconds (inclusive).
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
}

impl TimeRange {
    /// Create a range, rejecting `end < start` and non-finite bounds.
    pub fn new(start: f64, end: f64) -> Result<Self> {
        if !start.is_finite() || !end.is_finite() {
            return Err(WaveEditError::InvalidParameter(format!(
                "time range bounds must be finite, got [{start}, {end}]"
            )));
        }
        if end < start {
            return Err(WaveEditError::InvalidParameter(format!(
                "time range end {end} precedes start {start}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Range covering `[0, duration]`.
    #[inline]
    pub fn full(duration: f64) -> Self {
        Self {
            start: 0.0,
            end: duration.max(0.0),
        }
    }

    /// Length of the range in seconds.
    #[inline]
    pub fn duration(self) -> f64 {
        self.end - self.start
    }

    /// True when the range has zero width.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.end <= self.start
    }

    /// Check if a time is within this range (end exclusive).
    #[inline]
    pub fn contains(self, time: f64) -> bool {
        time >= self.start && time < self.end
    }

    /// Check if two ranges overlap.
    pub fn overlaps(self, other: Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Compute the intersection of two ranges, if any.
    pub fn intersection(self, other: Self) -> Option<Self> {
        if !self.overlaps(other) {
            return None;
        }
        Some(Self {
            start: self.start.max(other.start),
            end: self.end.min(other.end),
        })
    }

    /// Clamp both bounds into `[0, duration]`.
    pub fn clamped(self, duration: f64) -> Self {
        let max = duration.max(0.0);
        Self {
            start: self.start.clamp(0.0, max),
            end: self.end.clamp(0.0, max),
        }
    }

    /// Convert to a half-open frame span clamped to `length` frames.
    pub fn to_frames(self, sample_rate: f64, length: usize) -> FrameSpan {
        let start = seconds_to_frame(self.start, sample_rate).min(length);
        let end = seconds_to_frame(self.end, sample_rate).min(length);
        FrameSpan::new(start, end.max(start))
    }

    /// Build a range from a frame span.
    pub fn from_frames(span: FrameSpan, sample_rate: f64) -> Self {
        Self {
            start: frame_to_seconds(span.start, sample_rate),
            end: frame_to_seconds(span.end, sample_rate),
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.3}s, {:.3}s)", self.start, self.end)
    }
}
