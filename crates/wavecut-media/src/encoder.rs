//! Writing sample buffers back out.

use serde::{Deserialize, Serialize};
use std::io::{Seek, Write};
use std::path::Path;
use tracing::info;
use wavecut_core::{Result, SampleBuffer, WaveEditError};

use crate::encode_error;

/// Sample representation in the written file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SampleEncoding {
    /// 32-bit IEEE float.
    #[default]
    Float32,
    /// 16-bit signed integer, clipped to [-1, 1].
    Int16,
}

/// Output format settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EncodeSettings {
    pub encoding: SampleEncoding,
}

/// Writes a buffer to a destination file.
pub trait AudioEncoder {
    fn encode(&self, buffer: &SampleBuffer, destination: &Path, settings: &EncodeSettings) -> Result<()>;
}

/// WAV encoder.
#[derive(Debug, Default, Clone, Copy)]
pub struct WavEncoder;

impl WavEncoder {
    /// Encode into any seekable writer.
    pub fn encode_writer<W: Write + Seek>(
        &self,
        buffer: &SampleBuffer,
        writer: W,
        settings: &EncodeSettings,
    ) -> Result<()> {
        let rate = buffer.sample_rate();
        if rate.fract() != 0.0 || rate > u32::MAX as f64 {
            return Err(WaveEditError::Encode(format!(
                "WAV requires an integral sample rate, got {rate}"
            )));
        }
        let channels = u16::try_from(buffer.channel_count()).map_err(|_| {
            WaveEditError::Encode(format!("too many channels: {}", buffer.channel_count()))
        })?;

        let (bits_per_sample, sample_format) = match settings.encoding {
            SampleEncoding::Float32 => (32, hound::SampleFormat::Float),
            SampleEncoding::Int16 => (16, hound::SampleFormat::Int),
        };
        let spec = hound::WavSpec {
            channels,
            sample_rate: rate as u32,
            bits_per_sample,
            sample_format,
        };

        let mut wav = hound::WavWriter::new(writer, spec).map_err(encode_error)?;
        for sample in buffer.to_interleaved() {
            let written = match settings.encoding {
                SampleEncoding::Float32 => wav.write_sample(sample),
                SampleEncoding::Int16 => {
                    wav.write_sample((sample.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16)
                }
            };
            written.map_err(encode_error)?;
        }
        wav.finalize().map_err(encode_error)
    }
}

impl AudioEncoder for WavEncoder {
    fn encode(&self, buffer: &SampleBuffer, destination: &Path, settings: &EncodeSettings) -> Result<()> {
        info!(
            frames = buffer.len_frames(),
            "Encoding audio file: {}",
            destination.display()
        );
        let file = std::fs::File::create(destination)
            .map_err(|e| WaveEditError::Encode(format!("{}: {e}", destination.display())))?;
        self.encode_writer(buffer, std::io::BufWriter::new(file), settings)
    }
}
