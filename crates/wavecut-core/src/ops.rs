//! Stateless operations on sample buffers.
//!
//! Every function builds its result in a fresh buffer and validates all
//! preconditions before copying, so a failure never leaves a destination
//! partially written. Copies are per-channel slice copies; there is no
//! resampling or format conversion.

use smallvec::SmallVec;

use crate::buffer::SampleBuffer;
use crate::error::{Result, WaveEditError};
use crate::time::FrameSpan;

/// Copy frames `[start_frame, end_frame)` into a new buffer of exactly that capacity.
pub fn extract(buffer: &SampleBuffer, start_frame: usize, end_frame: usize) -> Result<SampleBuffer> {
    if start_frame >= end_frame || end_frame > buffer.len_frames() {
        return Err(WaveEditError::InvalidRange {
            start: start_frame,
            end: end_frame,
            length: buffer.len_frames(),
        });
    }
    let frames = end_frame - start_frame;
    let mut segment = SampleBuffer::with_capacity(buffer.format(), frames)?;
    append(&mut segment, buffer, start_frame, frames)?;
    Ok(segment)
}

/// Copy `frame_count` frames of `src` starting at `src_start_frame` onto the
/// end of `dst`, then advance `dst`'s logical length.
pub fn append(
    dst: &mut SampleBuffer,
    src: &SampleBuffer,
    src_start_frame: usize,
    frame_count: usize,
) -> Result<()> {
    dst.format().ensure_matches(&src.format())?;

    let src_end = src_start_frame
        .checked_add(frame_count)
        .filter(|&end| end <= src.len_frames())
        .ok_or(WaveEditError::RangeOutOfBounds {
            start: src_start_frame,
            count: frame_count,
            length: src.len_frames(),
        })?;

    if frame_count > dst.remaining_capacity() {
        return Err(WaveEditError::CapacityExceeded {
            requested: dst.len_frames() + frame_count,
            capacity: dst.capacity_frames(),
        });
    }

    // Formats match, so both sides have the same channel count.
    for (to, from) in dst.spare_channels_mut(frame_count).zip(src.channels()) {
        to.copy_from_slice(&from[src_start_frame..src_end]);
    }
    dst.advance(frame_count);
    Ok(())
}

/// Join the in-use frames of every buffer, in order, into one new buffer.
pub fn concatenate(buffers: &[&SampleBuffer]) -> Result<SampleBuffer> {
    let first = buffers.first().ok_or(WaveEditError::EmptyInput)?;
    let format = first.format();
    for buffer in &buffers[1..] {
        format.ensure_matches(&buffer.format())?;
    }

    let total: usize = buffers.iter().map(|b| b.len_frames()).sum();
    let mut out = SampleBuffer::with_capacity(format, total)?;
    for buffer in buffers {
        append(&mut out, buffer, 0, buffer.len_frames())?;
    }
    Ok(out)
}

/// Result of removing a span from a buffer.
#[derive(Debug)]
pub struct Removal {
    /// What is left; `None` when the span covered the whole buffer.
    pub kept: Option<SampleBuffer>,
    /// The frames that were taken out.
    pub removed: SampleBuffer,
}

/// Remove `span` from `buffer`, returning both the remainder and the removed frames.
///
/// A span starting at frame 0 has no head segment and a span ending at the
/// last frame has no tail segment.
pub fn remove_span(buffer: &SampleBuffer, span: FrameSpan) -> Result<Removal> {
    let length = buffer.len_frames();
    let removed = extract(buffer, span.start, span.end)?;

    let head = if span.start > 0 {
        Some(extract(buffer, 0, span.start)?)
    } else {
        None
    };
    let tail = if span.end < length {
        Some(extract(buffer, span.end, length)?)
    } else {
        None
    };

    let parts: SmallVec<[&SampleBuffer; 2]> = head.iter().chain(tail.iter()).collect();
    let kept = if parts.is_empty() {
        None
    } else {
        Some(concatenate(&parts)?)
    };
    Ok(Removal { kept, removed })
}

/// Insert `insert` into `base` before frame `at_frame`.
///
/// With no base the inserted buffer becomes the whole result, which is how
/// pasting into an empty document works.
pub fn insert_at(
    base: Option<&SampleBuffer>,
    insert: &SampleBuffer,
    at_frame: usize,
) -> Result<SampleBuffer> {
    let Some(base) = base else {
        if at_frame != 0 {
            return Err(WaveEditError::InvalidRange {
                start: at_frame,
                end: at_frame,
                length: 0,
            });
        }
        return Ok(insert.clone());
    };

    base.format().ensure_matches(&insert.format())?;
    let length = base.len_frames();
    if at_frame > length {
        return Err(WaveEditError::InvalidRange {
            start: at_frame,
            end: at_frame,
            length,
        });
    }

    let head = if at_frame > 0 {
        Some(extract(base, 0, at_frame)?)
    } else {
        None
    };
    let tail = if at_frame < length {
        Some(extract(base, at_frame, length)?)
    } else {
        None
    };

    let mut parts: SmallVec<[&SampleBuffer; 3]> = SmallVec::new();
    parts.extend(head.iter());
    parts.push(insert);
    parts.extend(tail.iter());
    concatenate(&parts)
}
