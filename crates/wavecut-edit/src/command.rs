//! Reversible edit commands over the document buffer.
//!
//! Uses the Command pattern: applying a command never touches the current
//! buffer, it returns the replacement buffer together with the command
//! that undoes it. Positions are frames, so an inverse reproduces the
//! exact boundaries of the edit it reverses.

use wavecut_core::ops::{insert_at, remove_span};
use wavecut_core::{FrameSpan, Result, SampleBuffer, WaveEditError};

/// A reversible edit on the document buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum EditCommand {
    /// Remove the frames in `span`.
    Delete { span: FrameSpan },
    /// Insert `buffer` before frame `at_frame`.
    Insert { at_frame: usize, buffer: SampleBuffer },
}

/// Outcome of applying a command.
#[derive(Debug)]
pub struct Applied {
    /// Replacement document buffer; `None` when nothing is left.
    pub buffer: Option<SampleBuffer>,
    /// Command that reverses this one.
    pub inverse: EditCommand,
    /// Span to select afterwards.
    pub selection: Option<FrameSpan>,
    /// Frame to place the cursor on afterwards.
    pub cursor_frame: usize,
}

impl EditCommand {
    /// Apply to `current` without mutating it.
    pub fn apply(&self, current: Option<&SampleBuffer>) -> Result<Applied> {
        match self {
            Self::Delete { span } => {
                let buffer = current.ok_or(WaveEditError::NotLoaded)?;
                let removal = remove_span(buffer, *span)?;
                Ok(Applied {
                    buffer: removal.kept,
                    inverse: Self::Insert {
                        at_frame: span.start,
                        buffer: removal.removed,
                    },
                    selection: None,
                    cursor_frame: span.start,
                })
            }
            Self::Insert { at_frame, buffer } => {
                if buffer.is_empty() {
                    return Err(WaveEditError::InvalidRange {
                        start: *at_frame,
                        end: *at_frame,
                        length: current.map_or(0, SampleBuffer::len_frames),
                    });
                }
                let result = insert_at(current, buffer, *at_frame)?;
                let span = FrameSpan::new(*at_frame, at_frame + buffer.len_frames());
                Ok(Applied {
                    buffer: Some(result),
                    inverse: Self::Delete { span },
                    selection: Some(span),
                    cursor_frame: *at_frame,
                })
            }
        }
    }

    /// Audio this command inserts. For the inverse of a delete, the removed frames.
    pub fn payload(&self) -> Option<&SampleBuffer> {
        match self {
            Self::Delete { .. } => None,
            Self::Insert { buffer, .. } => Some(buffer),
        }
    }

    /// Number of frames the command adds (positive) or removes (negative).
    pub fn frame_delta(&self) -> i64 {
        match self {
            Self::Delete { span } => -(span.len() as i64),
            Self::Insert { buffer, .. } => buffer.len_frames() as i64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(frames: usize) -> SampleBuffer {
        SampleBuffer::from_channels(100.0, vec![(0..frames).map(|i| i as f32).collect()]).unwrap()
    }

    #[test]
    fn test_delete_then_inverse_restores() {
        let original = ramp(1000);
        let cmd = EditCommand::Delete {
            span: FrameSpan::new(400, 600),
        };
        let applied = cmd.apply(Some(&original)).unwrap();
        let edited = applied.buffer.unwrap();
        assert_eq!(edited.len_frames(), 800);
        assert_eq!(applied.cursor_frame, 400);
        assert!(applied.selection.is_none());
        assert_eq!(applied.inverse.frame_delta(), 200);
        let removed = applied.inverse.payload().unwrap();
        assert_eq!(removed.channel(0).unwrap()[0], 400.0);
        assert_eq!(removed.len_frames(), 200);
        assert!(cmd.payload().is_none());

        let undone = applied.inverse.apply(Some(&edited)).unwrap();
        assert_eq!(undone.buffer.unwrap(), original);
        assert_eq!(undone.selection, Some(FrameSpan::new(400, 600)));
        assert_eq!(undone.inverse, cmd);
    }

    #[test]
    fn test_insert_into_empty_document() {
        let clip = ramp(200);
        let cmd = EditCommand::Insert {
            at_frame: 0,
            buffer: clip.clone(),
        };
        let applied = cmd.apply(None).unwrap();
        assert_eq!(applied.buffer.as_ref().unwrap(), &clip);
        assert_eq!(applied.selection, Some(FrameSpan::new(0, 200)));
        assert_eq!(
            applied.inverse,
            EditCommand::Delete {
                span: FrameSpan::new(0, 200)
            }
        );
    }

    #[test]
    fn test_delete_everything_leaves_nothing() {
        let original = ramp(10);
        let applied = EditCommand::Delete {
            span: FrameSpan::new(0, 10),
        }
        .apply(Some(&original))
        .unwrap();
        assert!(applied.buffer.is_none());

        let undone = applied.inverse.apply(None).unwrap();
        assert_eq!(undone.buffer.unwrap(), original);
    }

    #[test]
    fn test_delete_without_document() {
        let err = EditCommand::Delete {
            span: FrameSpan::new(0, 1),
        }
        .apply(None)
        .unwrap_err();
        assert!(matches!(err, WaveEditError::NotLoaded));
    }

    #[test]
    fn test_empty_insert_rejected() {
        let empty = SampleBuffer::from_channels(100.0, vec![vec![]]).unwrap();
        let err = EditCommand::Insert {
            at_frame: 0,
            buffer: empty,
        }
        .apply(Some(&ramp(5)))
        .unwrap_err();
        assert!(matches!(err, WaveEditError::InvalidRange { .. }));
    }
}
