//! Shared fixtures.

use wavecut_audio::NullOutput;
use wavecut_core::{SampleBuffer, TimeRange};
use wavecut_edit::{EditEngine, EditorConfig, MemoryClipboard};

/// Frames per second used by the scenario buffers.
pub const RATE: f64 = 100.0;

/// Mono buffer whose sample value equals its frame index.
pub fn ramp(frames: usize) -> SampleBuffer {
    SampleBuffer::from_channels(RATE, vec![(0..frames).map(|i| i as f32).collect()]).unwrap()
}

/// Stereo buffer with distinct, recognizable channels.
pub fn stereo_ramp(frames: usize) -> SampleBuffer {
    let left = (0..frames).map(|i| i as f32).collect();
    let right = (0..frames).map(|i| -(i as f32)).collect();
    SampleBuffer::from_channels(RATE, vec![left, right]).unwrap()
}

pub fn range(start: f64, end: f64) -> TimeRange {
    TimeRange::new(start, end).unwrap()
}

pub fn engine() -> (EditEngine, MemoryClipboard) {
    let clipboard = MemoryClipboard::new();
    let engine = EditEngine::new(
        EditorConfig::default(),
        Box::new(NullOutput),
        Box::new(clipboard.clone()),
    )
    .unwrap();
    (engine, clipboard)
}
