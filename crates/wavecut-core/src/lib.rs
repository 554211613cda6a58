//! Wavecut Core - Foundation types for sample-accurate audio editing
//!
//! This crate provides the fundamental types used throughout Wavecut:
//! - Sample buffers (multi-channel, non-interleaved f32 PCM)
//! - Buffer operations (extract, append, concatenate, splice)
//! - Time ranges and seconds/frame conversion
//! - The clip interchange codec used for clipboard transfer

pub mod buffer;
pub mod clip;
pub mod error;
pub mod format;
pub mod ops;
pub mod time;

pub use buffer::SampleBuffer;
pub use error::{Result, WaveEditError};
pub use format::AudioFormat;
pub use time::{format_mmss, frame_to_seconds, seconds_to_frame, FrameSpan, TimeRange};
