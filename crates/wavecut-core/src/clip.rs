//! Clip interchange codec.
//!
//! Serializes a `SampleBuffer` into a self-describing byte blob for the
//! system clipboard, and back. Layout (all little-endian):
//!
//! ```text
//! magic         4 bytes  "WCLP"
//! version       u16
//! sample_rate   f64
//! channel_count u32
//! frames        u32
//! samples       channel_count * frames * f32, channel-major
//! ```

use crate::buffer::SampleBuffer;
use crate::error::{Result, WaveEditError};
use crate::format::AudioFormat;

/// Magic bytes at the start of every clip payload.
pub const CLIP_MAGIC: [u8; 4] = *b"WCLP";

/// Current payload version.
pub const CLIP_VERSION: u16 = 1;

const HEADER_LEN: usize = 4 + 2 + 8 + 4 + 4;

/// Encode the in-use frames of `buffer`.
pub fn encode_clip(buffer: &SampleBuffer) -> Result<Vec<u8>> {
    let frames = u32::try_from(buffer.len_frames()).map_err(|_| {
        WaveEditError::InvalidParameter(format!(
            "clip of {} frames is too long to encode",
            buffer.len_frames()
        ))
    })?;
    let payload_len = buffer.channel_count() as usize * buffer.len_frames() * 4;

    let mut out = Vec::new();
    out.try_reserve_exact(HEADER_LEN + payload_len)
        .map_err(|e| WaveEditError::AllocationFailure(e.to_string()))?;
    out.extend_from_slice(&CLIP_MAGIC);
    out.extend_from_slice(&CLIP_VERSION.to_le_bytes());
    out.extend_from_slice(&buffer.sample_rate().to_le_bytes());
    out.extend_from_slice(&buffer.channel_count().to_le_bytes());
    out.extend_from_slice(&frames.to_le_bytes());
    for channel in buffer.channels() {
        for sample in channel {
            out.extend_from_slice(&sample.to_le_bytes());
        }
    }
    Ok(out)
}

/// Decode a payload produced by [`encode_clip`].
pub fn decode_clip(bytes: &[u8]) -> Result<SampleBuffer> {
    let mut reader = Reader { bytes, pos: 0 };

    if reader.take(4)? != CLIP_MAGIC {
        return Err(unavailable("payload is not a wavecut clip"));
    }
    let version = u16::from_le_bytes(reader.array()?);
    if version != CLIP_VERSION {
        return Err(unavailable(&format!("unsupported clip version {version}")));
    }
    let sample_rate = f64::from_le_bytes(reader.array()?);
    let channel_count = u32::from_le_bytes(reader.array()?);
    let frames = u32::from_le_bytes(reader.array()?) as usize;

    let format = AudioFormat::new(sample_rate, channel_count)
        .map_err(|e| unavailable(&format!("invalid clip format: {e}")))?;

    let expected = (channel_count as usize)
        .checked_mul(frames)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| unavailable("clip size overflows"))?;
    if reader.remaining() != expected {
        return Err(unavailable(&format!(
            "clip declares {expected} sample bytes but carries {}",
            reader.remaining()
        )));
    }

    let mut channels = Vec::with_capacity(channel_count as usize);
    for _ in 0..channel_count {
        let raw = reader.take(frames * 4)?;
        let samples = raw
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        channels.push(samples);
    }
    SampleBuffer::from_channels(format.sample_rate, channels)
}

fn unavailable(reason: &str) -> WaveEditError {
    WaveEditError::ClipboardUnavailable(reason.to_string())
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| unavailable("clip payload is truncated"))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }
}
