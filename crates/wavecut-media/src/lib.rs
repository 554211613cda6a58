//! Wavecut Media - Audio file I/O adapters
//!
//! The edit core never parses containers itself. This crate defines the
//! narrow decoder/encoder interfaces it consumes and WAV implementations
//! backed by `hound`.

pub mod decoder;
pub mod encoder;

pub use decoder::{AudioDecoder, DecodedAudio, SourceInfo, WavDecoder};
pub use encoder::{AudioEncoder, EncodeSettings, SampleEncoding, WavEncoder};

/// Map a `hound` error onto the decoder error kind.
pub(crate) fn decode_error(e: hound::Error) -> wavecut_core::WaveEditError {
    wavecut_core::WaveEditError::Decode(e.to_string())
}

/// Map a `hound` error onto the encoder error kind.
pub(crate) fn encode_error(e: hound::Error) -> wavecut_core::WaveEditError {
    wavecut_core::WaveEditError::Encode(e.to_string())
}
