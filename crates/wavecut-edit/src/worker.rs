//! Background editor thread.
//!
//! The engine moves onto a dedicated thread and is driven through a FIFO
//! request channel, so at most one edit runs at a time and callers never
//! block on buffer copies. Readers use the published snapshot, which is
//! swapped atomically after each step.
//!
//! While playing, the loop wakes at the configured poll rate to read the
//! play head and emit `EditorEvent::PlaybackPosition`.

use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::{debug, info, warn};
use wavecut_core::{Result, SampleBuffer, TimeRange, WaveEditError};

use crate::engine::EditEngine;
use crate::state::{Document, EditorEvent, EditorState, SnapshotReader};

/// Work the editor thread can be asked to do.
#[derive(Debug)]
pub enum EditRequest {
    Load(SampleBuffer),
    Delete(TimeRange),
    DeleteSelection,
    Paste { buffer: SampleBuffer, at: f64 },
    PasteFromClipboard,
    Copy(TimeRange),
    CopySelection,
    Cut(TimeRange),
    CutSelection,
    Undo,
    Redo,
    SetSelection(Option<TimeRange>),
    SelectAll,
    SetVisibleRange(TimeRange),
    Seek(f64),
    Forward,
    Backward,
    ForwardEnd,
    BackwardEnd,
    /// Toggle playback.
    Play,
    Stop,
}

impl EditRequest {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Load(_) => "load",
            Self::Delete(_) => "delete",
            Self::DeleteSelection => "delete_selection",
            Self::Paste { .. } => "paste",
            Self::PasteFromClipboard => "paste_from_clipboard",
            Self::Copy(_) => "copy",
            Self::CopySelection => "copy_selection",
            Self::Cut(_) => "cut",
            Self::CutSelection => "cut_selection",
            Self::Undo => "undo",
            Self::Redo => "redo",
            Self::SetSelection(_) => "set_selection",
            Self::SelectAll => "select_all",
            Self::SetVisibleRange(_) => "set_visible_range",
            Self::Seek(_) => "seek",
            Self::Forward => "forward",
            Self::Backward => "backward",
            Self::ForwardEnd => "forward_end",
            Self::BackwardEnd => "backward_end",
            Self::Play => "play",
            Self::Stop => "stop",
        }
    }

    fn apply(self, engine: &mut EditEngine) -> Result<()> {
        match self {
            Self::Load(buffer) => {
                engine.load(buffer);
                Ok(())
            }
            Self::Delete(range) => engine.delete(range),
            Self::DeleteSelection => engine.delete_selection(),
            Self::Paste { buffer, at } => engine.paste(buffer, at),
            Self::PasteFromClipboard => engine.paste_from_clipboard(),
            Self::Copy(range) => engine.copy(range).map(drop),
            Self::CopySelection => engine.copy_selection().map(drop),
            Self::Cut(range) => engine.cut(range),
            Self::CutSelection => engine.cut_selection(),
            Self::Undo => engine.undo().map(drop),
            Self::Redo => engine.redo().map(drop),
            Self::SetSelection(range) => {
                engine.set_selection(range);
                Ok(())
            }
            Self::SelectAll => {
                engine.select_all();
                Ok(())
            }
            Self::SetVisibleRange(range) => {
                engine.set_visible_range(range);
                Ok(())
            }
            Self::Seek(time) => engine.seek(time),
            Self::Forward => engine.forward(),
            Self::Backward => engine.backward(),
            Self::ForwardEnd => engine.forward_end(),
            Self::BackwardEnd => engine.backward_end(),
            Self::Play => engine.play(),
            Self::Stop => {
                engine.stop();
                Ok(())
            }
        }
    }
}

enum Message {
    Request(EditRequest),
    Subscribe(Sender<Receiver<EditorEvent>>),
    Shutdown,
}

/// Handle to an `EditEngine` running on its own thread.
pub struct EditorWorker {
    tx: Sender<Message>,
    reader: SnapshotReader,
    handle: Option<JoinHandle<()>>,
}

impl EditorWorker {
    /// Move `engine` onto a new thread.
    pub fn spawn(engine: EditEngine) -> Result<Self> {
        let reader = engine.snapshot_reader();
        let (tx, rx) = unbounded();
        let handle = thread::Builder::new()
            .name("wavecut-editor".into())
            .spawn(move || run(engine, rx))?;
        info!("Editor worker started");
        Ok(Self {
            tx,
            reader,
            handle: Some(handle),
        })
    }

    /// Queue a request. Requests run one at a time in submission order.
    pub fn submit(&self, request: EditRequest) -> Result<()> {
        self.tx
            .send(Message::Request(request))
            .map_err(|_| WaveEditError::Internal("editor worker has stopped".into()))
    }

    /// Latest published state.
    pub fn snapshot(&self) -> Arc<EditorState> {
        self.reader.snapshot()
    }

    /// Current buffer and envelope, as one consistent pair.
    pub fn document(&self) -> Option<Arc<Document>> {
        self.reader.document()
    }

    pub fn reader(&self) -> SnapshotReader {
        self.reader.clone()
    }

    /// Receive events published after all previously submitted requests.
    pub fn subscribe(&self) -> Result<Receiver<EditorEvent>> {
        let (reply_tx, reply_rx) = bounded(1);
        self.tx
            .send(Message::Subscribe(reply_tx))
            .map_err(|_| WaveEditError::Internal("editor worker has stopped".into()))?;
        reply_rx
            .recv()
            .map_err(|_| WaveEditError::Internal("editor worker did not answer".into()))
    }

    /// Finish queued requests, then stop the thread.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        let _ = self.tx.send(Message::Shutdown);
        if handle.join().is_err() {
            warn!("Editor worker panicked");
        }
    }
}

impl Drop for EditorWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(mut engine: EditEngine, rx: Receiver<Message>) {
    let interval = engine.config().poll_interval();
    let mut next_poll = Instant::now() + interval;

    loop {
        let message = if engine.is_playing() {
            let wait = next_poll.saturating_duration_since(Instant::now());
            match rx.recv_timeout(wait) {
                Ok(message) => Some(message),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        } else {
            match rx.recv() {
                Ok(message) => Some(message),
                Err(_) => break,
            }
        };

        match message {
            Some(Message::Request(request)) => {
                let name = request.name();
                debug!(request = name, "Handling request");
                // Failures were already published as `EditorEvent::Failed`.
                if let Err(e) = request.apply(&mut engine) {
                    debug!(request = name, error = %e, "Request failed");
                }
            }
            Some(Message::Subscribe(reply)) => {
                let _ = reply.send(engine.subscribe());
            }
            Some(Message::Shutdown) => break,
            None => {}
        }

        if engine.is_playing() && Instant::now() >= next_poll {
            engine.poll_playback();
            next_poll = Instant::now() + interval;
        }
    }

    engine.stop();
    info!("Editor worker stopped");
}
