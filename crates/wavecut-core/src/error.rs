//! Error types for Wavecut.

use crate::format::AudioFormat;
use thiserror::Error;

/// Main error type for Wavecut operations.
#[derive(Error, Debug)]
pub enum WaveEditError {
    #[error("Invalid range: [{start}, {end}) for buffer of {length} frames")]
    InvalidRange {
        start: usize,
        end: usize,
        length: usize,
    },

    #[error("Format mismatch: expected {expected}, found {found}")]
    FormatMismatch {
        expected: AudioFormat,
        found: AudioFormat,
    },

    #[error("Capacity exceeded: {requested} frames requested, capacity is {capacity}")]
    CapacityExceeded { requested: usize, capacity: usize },

    #[error("Range out of bounds: {count} frames from {start} in buffer of {length} frames")]
    RangeOutOfBounds {
        start: usize,
        count: usize,
        length: usize,
    },

    #[error("Concatenation requires at least one buffer")]
    EmptyInput,

    #[error("Allocation failure: {0}")]
    AllocationFailure(String),

    #[error("Decoder error: {0}")]
    Decode(String),

    #[error("Encoder error: {0}")]
    Encode(String),

    #[error("Clipboard unavailable: {0}")]
    ClipboardUnavailable(String),

    #[error("No audio loaded")]
    NotLoaded,

    #[error("Playback error: {0}")]
    Playback(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Wavecut operations.
pub type Result<T> = std::result::Result<T, WaveEditError>;
