//! Published editor state.
//!
//! The buffer and its envelope travel together in one [`Document`] behind a
//! single `Arc`, and the whole [`EditorState`] is replaced by swapping
//! another `Arc` under a lock. Readers clone the current `Arc` and never
//! observe a buffer paired with an envelope from a different edit.

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use wavecut_audio::{CompressionStrategy, PlayerState, WaveformEnvelope};
use wavecut_core::{format_mmss, AudioFormat, FrameSpan, SampleBuffer, TimeRange};

/// Whether an edit is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EngineStatus {
    #[default]
    Ready,
    Processing,
}

/// One version of the loaded audio.
#[derive(Debug)]
pub struct Document {
    pub buffer: Arc<SampleBuffer>,
    pub envelope: WaveformEnvelope,
}

impl Document {
    /// Wrap `buffer` and summarize it.
    pub fn new(buffer: SampleBuffer, compression: CompressionStrategy) -> Self {
        let envelope = WaveformEnvelope::summarize_with(&buffer, compression);
        Self {
            buffer: Arc::new(buffer),
            envelope,
        }
    }

    pub fn format(&self) -> AudioFormat {
        self.buffer.format()
    }

    pub fn duration(&self) -> f64 {
        self.buffer.duration_secs()
    }

    pub fn power_at(&self, time: f64) -> f32 {
        self.envelope.power_at(time)
    }

    /// Summary such as `44.1 kHz | Stereo | 01:05`.
    pub fn status_line(&self) -> String {
        let format = self.format();
        format!(
            "{} kHz | {} | {}",
            format.sample_rate / 1000.0,
            format.layout_name(),
            format_mmss(self.duration())
        )
    }
}

/// Everything a renderer needs to draw the editor.
#[derive(Debug, Clone, Default)]
pub struct EditorState {
    /// Current audio; `None` while the document is empty.
    pub document: Option<Arc<Document>>,
    pub selection: Option<TimeRange>,
    /// Selected frames. `selection` is derived from this.
    pub selection_frames: Option<FrameSpan>,
    /// Portion of the timeline on screen.
    pub visible: Option<TimeRange>,
    /// Cursor (play head) time in seconds.
    pub cursor: f64,
    /// Cursor position in frames. `cursor` is derived from this.
    pub cursor_frame: usize,
    pub player: PlayerState,
    pub status: EngineStatus,
    pub can_undo: bool,
    pub can_redo: bool,
    pub undo_name: Option<String>,
    pub redo_name: Option<String>,
    /// Incremented on every publish.
    pub revision: u64,
}

impl EditorState {
    pub fn is_loaded(&self) -> bool {
        self.document.is_some()
    }

    pub fn duration(&self) -> f64 {
        self.document.as_ref().map_or(0.0, |d| d.duration())
    }

    pub fn envelope(&self) -> Option<&WaveformEnvelope> {
        self.document.as_ref().map(|d| &d.envelope)
    }

    pub fn power_at(&self, time: f64) -> f32 {
        self.document.as_ref().map_or(0.0, |d| d.power_at(time))
    }

    pub fn status_line(&self) -> Option<String> {
        self.document.as_ref().map(|d| d.status_line())
    }
}

/// Notifications sent to subscribers.
#[derive(Debug, Clone)]
pub enum EditorEvent {
    /// A new state was published.
    StateChanged(Arc<EditorState>),
    /// An operation was rejected; the state is unchanged.
    Failed { action: String, error: String },
    /// Play head position during playback, in seconds.
    PlaybackPosition(f64),
}

/// Read-only handle onto the latest published state.
#[derive(Debug, Clone)]
pub struct SnapshotReader {
    current: Arc<RwLock<Arc<EditorState>>>,
}

impl SnapshotReader {
    pub fn snapshot(&self) -> Arc<EditorState> {
        Arc::clone(&self.current.read())
    }

    pub fn document(&self) -> Option<Arc<Document>> {
        self.current.read().document.clone()
    }

    pub fn duration(&self) -> f64 {
        self.snapshot().duration()
    }

    pub fn power_at(&self, time: f64) -> f32 {
        self.snapshot().power_at(time)
    }
}

/// Owner side of the snapshot plus the subscriber list.
#[derive(Debug)]
pub(crate) struct StatePublisher {
    current: Arc<RwLock<Arc<EditorState>>>,
    subscribers: Vec<Sender<EditorEvent>>,
    revision: u64,
}

impl StatePublisher {
    pub fn new() -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(EditorState::default()))),
            subscribers: Vec::new(),
            revision: 0,
        }
    }

    pub fn reader(&self) -> SnapshotReader {
        SnapshotReader {
            current: Arc::clone(&self.current),
        }
    }

    pub fn current(&self) -> Arc<EditorState> {
        Arc::clone(&self.current.read())
    }

    pub fn subscribe(&mut self) -> Receiver<EditorEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Swap in `state` without notifying subscribers.
    pub fn store(&mut self, mut state: EditorState) -> Arc<EditorState> {
        self.revision += 1;
        state.revision = self.revision;
        let state = Arc::new(state);
        *self.current.write() = Arc::clone(&state);
        state
    }

    /// Swap in `state` and send `StateChanged`.
    pub fn publish(&mut self, state: EditorState) {
        let state = self.store(state);
        self.emit(EditorEvent::StateChanged(state));
    }

    /// Send an event; subscribers whose receiver was dropped are forgotten.
    pub fn emit(&mut self, event: EditorEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}
