//! Wavecut Audio - Envelopes and playback
//!
//! Architecture:
//! - `WaveformEnvelope`: downsampled amplitude summary for display and metering
//! - `AudioOutput`: narrow interface to an external output device
//! - `Player`: schedules one segment and reports the play head on request

pub mod output;
pub mod player;
pub mod waveform;

pub use output::{AudioOutput, CompletionHandler, NullOutput, SimulatedClock, SimulatedOutput};
pub use player::{PlaybackTick, Player, PlayerState};
pub use waveform::{amplitude_to_db, scaled_power, CompressionStrategy, WaveformEnvelope};
