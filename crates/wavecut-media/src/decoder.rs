//! Audio decoding into non-interleaved f32 sample buffers.

use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use tracing::info;
use wavecut_core::{AudioFormat, Result, SampleBuffer, WaveEditError};

use crate::decode_error;

/// Native properties of a decoded source file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourceInfo {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    pub is_float: bool,
    pub duration_secs: f64,
}

/// A fully materialized file.
#[derive(Debug)]
pub struct DecodedAudio {
    pub buffer: SampleBuffer,
    pub source: SourceInfo,
}

/// Turns a file into a sample buffer.
pub trait AudioDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedAudio>;
}

/// WAV decoder (8/16/24/32-bit integer and 32-bit float PCM).
#[derive(Debug, Default, Clone, Copy)]
pub struct WavDecoder;

impl WavDecoder {
    /// Decode WAV data from any reader.
    pub fn decode_reader<R: Read>(&self, reader: R) -> Result<DecodedAudio> {
        let mut reader = hound::WavReader::new(reader).map_err(decode_error)?;
        let spec = reader.spec();
        let format = AudioFormat::new(spec.sample_rate as f64, spec.channels as u32)
            .map_err(|e| WaveEditError::Decode(e.to_string()))?;

        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<std::result::Result<_, _>>()
                .map_err(decode_error)?,
            hound::SampleFormat::Int => {
                if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
                    return Err(WaveEditError::Decode(format!(
                        "unsupported bit depth {}",
                        spec.bits_per_sample
                    )));
                }
                let scale = 1.0 / (1u64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 * scale))
                    .collect::<std::result::Result<_, _>>()
                    .map_err(decode_error)?
            }
        };

        let buffer = SampleBuffer::from_interleaved(format, &interleaved)
            .map_err(|e| WaveEditError::Decode(e.to_string()))?;
        let source = SourceInfo {
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            bits_per_sample: spec.bits_per_sample,
            is_float: spec.sample_format == hound::SampleFormat::Float,
            duration_secs: buffer.duration_secs(),
        };
        Ok(DecodedAudio { buffer, source })
    }
}

impl AudioDecoder for WavDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedAudio> {
        info!("Decoding audio file: {}", path.display());
        let file = std::fs::File::open(path)
            .map_err(|e| WaveEditError::Decode(format!("{}: {e}", path.display())))?;
        let decoded = self.decode_reader(std::io::BufReader::new(file))?;
        info!(
            sample_rate = decoded.source.sample_rate,
            channels = decoded.source.channels,
            frames = decoded.buffer.len_frames(),
            "Decoded audio"
        );
        Ok(decoded)
    }
}
