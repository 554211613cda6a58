//! Multi-channel, non-interleaved f32 sample buffers.
//!
//! A `SampleBuffer` has a fixed capacity chosen at allocation time and a
//! logical length (`len_frames`) that only grows through `ops::append`.
//! Every channel array holds exactly `capacity_frames` samples.

use std::fmt;

use crate::error::{Result, WaveEditError};
use crate::format::AudioFormat;
use crate::time::{frame_to_seconds, seconds_to_frame};

/// Decoded PCM audio owned by a single holder.
#[derive(Clone)]
pub struct SampleBuffer {
    format: AudioFormat,
    capacity: usize,
    length: usize,
    channels: Vec<Vec<f32>>,
}

impl SampleBuffer {
    /// Allocate an empty buffer able to hold `capacity_frames` frames.
    pub fn with_capacity(format: AudioFormat, capacity_frames: usize) -> Result<Self> {
        let mut channels = Vec::new();
        channels
            .try_reserve_exact(format.channel_count as usize)
            .map_err(|e| WaveEditError::AllocationFailure(e.to_string()))?;
        for _ in 0..format.channel_count {
            let mut data = Vec::new();
            data.try_reserve_exact(capacity_frames).map_err(|e| {
                WaveEditError::AllocationFailure(format!(
                    "{capacity_frames} frames per channel: {e}"
                ))
            })?;
            data.resize(capacity_frames, 0.0);
            channels.push(data);
        }
        Ok(Self {
            format,
            capacity: capacity_frames,
            length: 0,
            channels,
        })
    }

    /// Build a full buffer from per-channel sample vectors of equal length.
    pub fn from_channels(sample_rate: f64, channels: Vec<Vec<f32>>) -> Result<Self> {
        let format = AudioFormat::new(sample_rate, channel_count(channels.len())?)?;
        let length = channels.first().map_or(0, Vec::len);
        if let Some((index, ch)) = channels.iter().enumerate().find(|(_, c)| c.len() != length) {
            return Err(WaveEditError::InvalidParameter(format!(
                "channel {index} has {} frames, channel 0 has {length}",
                ch.len()
            )));
        }
        Ok(Self {
            format,
            capacity: length,
            length,
            channels,
        })
    }

    /// Build a full buffer from interleaved samples (`frame0ch0, frame0ch1, ...`).
    pub fn from_interleaved(format: AudioFormat, samples: &[f32]) -> Result<Self> {
        let channel_count = format.channel_count as usize;
        if samples.len() % channel_count != 0 {
            return Err(WaveEditError::InvalidParameter(format!(
                "{} interleaved samples do not divide into {channel_count} channels",
                samples.len()
            )));
        }
        let frames = samples.len() / channel_count;
        let mut buffer = Self::with_capacity(format, frames)?;
        for (frame_index, frame) in samples.chunks_exact(channel_count).enumerate() {
            for (ch, &sample) in frame.iter().enumerate() {
                buffer.channels[ch][frame_index] = sample;
            }
        }
        buffer.length = frames;
        Ok(buffer)
    }

    /// Interleave the in-use frames.
    pub fn to_interleaved(&self) -> Vec<f32> {
        let channel_count = self.channels.len();
        let mut out = Vec::with_capacity(self.length * channel_count);
        for frame in 0..self.length {
            for ch in &self.channels {
                out.push(ch[frame]);
            }
        }
        out
    }

    #[inline]
    pub fn format(&self) -> AudioFormat {
        self.format
    }

    #[inline]
    pub fn sample_rate(&self) -> f64 {
        self.format.sample_rate
    }

    #[inline]
    pub fn channel_count(&self) -> u32 {
        self.format.channel_count
    }

    #[inline]
    pub fn capacity_frames(&self) -> usize {
        self.capacity
    }

    /// Logical length in frames.
    #[inline]
    pub fn len_frames(&self) -> usize {
        self.length
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Frames that can still be appended.
    #[inline]
    pub fn remaining_capacity(&self) -> usize {
        self.capacity - self.length
    }

    /// Duration of the in-use frames in seconds.
    #[inline]
    pub fn duration_secs(&self) -> f64 {
        frame_to_seconds(self.length, self.format.sample_rate)
    }

    /// Frame index for a time, clamped to the logical length.
    #[inline]
    pub fn frame_at(&self, seconds: f64) -> usize {
        seconds_to_frame(seconds, self.format.sample_rate).min(self.length)
    }

    /// In-use samples of one channel.
    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(|c| &c[..self.length])
    }

    /// Iterate the in-use samples of every channel in order.
    pub fn channels(&self) -> impl Iterator<Item = &[f32]> + '_ {
        self.channels.iter().map(move |c| &c[..self.length])
    }

    /// Mutable access to the in-use samples of one channel.
    pub fn channel_mut(&mut self, index: usize) -> Option<&mut [f32]> {
        let length = self.length;
        self.channels.get_mut(index).map(|c| &mut c[..length])
    }

    /// Writable tail of every channel past the logical length. Used by `ops::append`.
    pub(crate) fn spare_channels_mut(
        &mut self,
        count: usize,
    ) -> impl Iterator<Item = &mut [f32]> + '_ {
        let start = self.length;
        let end = (start + count).min(self.capacity);
        self.channels.iter_mut().map(move |c| &mut c[start..end])
    }

    pub(crate) fn advance(&mut self, frames: usize) {
        debug_assert!(self.length + frames <= self.capacity);
        self.length += frames;
    }
}

fn channel_count(count: usize) -> Result<u32> {
    u32::try_from(count)
        .map_err(|_| WaveEditError::InvalidParameter(format!("{count} channels is too many")))
}

/// Equality is format, length and the bit pattern of every in-use sample.
/// Capacity is not part of the content.
impl PartialEq for SampleBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.format == other.format
            && self.length == other.length
            && self.channels().zip(other.channels()).all(|(a, b)| {
                a.iter()
                    .zip(b.iter())
                    .all(|(x, y)| x.to_bits() == y.to_bits())
            })
    }
}

impl fmt::Debug for SampleBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SampleBuffer")
            .field("format", &self.format)
            .field("capacity", &self.capacity)
            .field("length", &self.length)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_capacity_starts_empty() {
        let fmt = AudioFormat::stereo(48000.0).unwrap();
        let buf = SampleBuffer::with_capacity(fmt, 256).unwrap();
        assert_eq!(buf.capacity_frames(), 256);
        assert_eq!(buf.len_frames(), 0);
        assert!(buf.is_empty());
        assert_eq!(buf.channel(1).unwrap().len(), 0);
        assert_eq!(buf.remaining_capacity(), 256);
    }

    #[test]
    fn test_from_channels_rejects_ragged() {
        let err = SampleBuffer::from_channels(100.0, vec![vec![0.0; 4], vec![0.0; 3]]);
        assert!(matches!(err, Err(WaveEditError::InvalidParameter(_))));
        assert!(SampleBuffer::from_channels(100.0, vec![]).is_err());
    }

    #[test]
    fn test_channel_count_must_fit_the_format() {
        assert_eq!(channel_count(2).unwrap(), 2);
        assert_eq!(channel_count(u32::MAX as usize).unwrap(), u32::MAX);
        #[cfg(target_pointer_width = "64")]
        assert!(matches!(
            channel_count(u32::MAX as usize + 1),
            Err(WaveEditError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_interleave_round_trip() {
        let fmt = AudioFormat::stereo(100.0).unwrap();
        let interleaved = vec![0.1, -0.1, 0.2, -0.2, 0.3, -0.3];
        let buf = SampleBuffer::from_interleaved(fmt, &interleaved).unwrap();
        assert_eq!(buf.len_frames(), 3);
        assert_eq!(buf.channel(0).unwrap(), &[0.1, 0.2, 0.3]);
        assert_eq!(buf.channel(1).unwrap(), &[-0.1, -0.2, -0.3]);
        assert_eq!(buf.to_interleaved(), interleaved);

        assert!(SampleBuffer::from_interleaved(fmt, &[0.0; 5]).is_err());
    }

    #[test]
    fn test_duration_and_frame_at() {
        let buf = SampleBuffer::from_channels(100.0, vec![vec![0.0; 1000]]).unwrap();
        assert!((buf.duration_secs() - 10.0).abs() < 1e-12);
        assert_eq!(buf.frame_at(4.0), 400);
        assert_eq!(buf.frame_at(25.0), 1000);
    }

    #[test]
    fn test_equality_ignores_capacity() {
        let a = SampleBuffer::from_channels(100.0, vec![vec![1.0, 2.0]]).unwrap();
        let mut b = SampleBuffer::with_capacity(a.format(), 10).unwrap();
        for spare in b.spare_channels_mut(2) {
            spare.copy_from_slice(&[1.0, 2.0]);
        }
        b.advance(2);
        assert_eq!(a, b);

        let c = SampleBuffer::from_channels(100.0, vec![vec![1.0, 2.5]]).unwrap();
        assert_ne!(a, c);
    }
}
