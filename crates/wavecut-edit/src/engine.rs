//! The editing engine.
//!
//! `EditEngine` exclusively owns the current document, the selection and
//! cursor, the undo history and the player. Every mutating edit is built
//! off to the side by an [`EditCommand`] and swapped in only when it fully
//! succeeds; a rejected operation leaves the engine as it was and
//! publishes an [`EditorEvent::Failed`].
//!
//! The cursor and selection are stored as frames. Seconds are derived from
//! them for display, and only caller-supplied seconds are ever truncated.

use crossbeam_channel::Receiver;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};
use wavecut_audio::{AudioOutput, PlaybackTick, Player, PlayerState};
use wavecut_core::ops::extract;
use wavecut_core::{
    frame_to_seconds, seconds_to_frame, FrameSpan, Result, SampleBuffer, TimeRange, WaveEditError,
};
use wavecut_media::{AudioDecoder, AudioEncoder, EncodeSettings, SourceInfo};

use crate::clipboard::{fetch_buffer, publish_buffer, ClipboardStore};
use crate::command::{Applied, EditCommand};
use crate::config::EditorConfig;
use crate::state::{
    Document, EditorEvent, EditorState, EngineStatus, SnapshotReader, StatePublisher,
};
use crate::undo::{UndoEntry, UndoStack};

/// Synchronous editor core. Wrap it in an `EditorWorker` to run edits off
/// the calling thread.
pub struct EditEngine {
    config: EditorConfig,
    document: Option<Arc<Document>>,
    selection: Option<FrameSpan>,
    visible: Option<TimeRange>,
    cursor_frame: usize,
    status: EngineStatus,
    undo: UndoStack,
    player: Player,
    clipboard: Box<dyn ClipboardStore>,
    publisher: StatePublisher,
}

impl EditEngine {
    /// Create an empty engine.
    pub fn new(
        config: EditorConfig,
        output: Box<dyn AudioOutput>,
        clipboard: Box<dyn ClipboardStore>,
    ) -> Result<Self> {
        config.validate()?;
        let mut engine = Self {
            undo: UndoStack::new(config.undo_depth),
            config,
            document: None,
            selection: None,
            visible: None,
            cursor_frame: 0,
            status: EngineStatus::Ready,
            player: Player::new(output),
            clipboard,
            publisher: StatePublisher::new(),
        };
        let initial = engine.build_state();
        engine.publisher.store(initial);
        Ok(engine)
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    // ---- Loading and saving ----

    /// Replace the document with `buffer`, discarding history.
    pub fn load(&mut self, buffer: SampleBuffer) {
        self.player.stop();
        self.undo.clear();
        info!(
            frames = buffer.len_frames(),
            format = %buffer.format(),
            "Loaded audio"
        );
        if buffer.is_empty() {
            self.document = None;
            self.visible = None;
        } else {
            let document = Document::new(buffer, self.config.compression);
            self.visible = Some(TimeRange::full(document.duration()));
            self.document = Some(Arc::new(document));
        }
        self.selection = None;
        self.cursor_frame = 0;
        self.status = EngineStatus::Ready;
        self.publish();
    }

    /// Decode `path` and load it.
    pub fn open(&mut self, decoder: &dyn AudioDecoder, path: &Path) -> Result<SourceInfo> {
        let decoded = decoder.decode(path).map_err(|e| self.reject("Open", e))?;
        self.load(decoded.buffer);
        Ok(decoded.source)
    }

    /// Write the current document through `encoder`.
    pub fn save(
        &mut self,
        encoder: &dyn AudioEncoder,
        destination: &Path,
        settings: &EncodeSettings,
    ) -> Result<()> {
        let result = match &self.document {
            Some(doc) => encoder.encode(&doc.buffer, destination, settings),
            None => Err(WaveEditError::NotLoaded),
        };
        result.map_err(|e| self.reject("Save", e))
    }

    // ---- Edits ----

    /// Remove `range` from the document.
    pub fn delete(&mut self, range: TimeRange) -> Result<()> {
        match self.span_for(range) {
            Ok(span) => self.delete_frames(span),
            Err(e) => Err(self.reject("Delete", e)),
        }
    }

    /// Remove the frames in `span`.
    pub fn delete_frames(&mut self, span: FrameSpan) -> Result<()> {
        let result = self
            .check_span(span)
            .and_then(|span| self.execute("Delete", EditCommand::Delete { span }));
        result.map_err(|e| self.reject("Delete", e))
    }

    pub fn delete_selection(&mut self) -> Result<()> {
        match self.require_selection() {
            Ok(span) => self.delete_frames(span),
            Err(e) => Err(self.reject("Delete", e)),
        }
    }

    /// Insert `buffer` at time `at`. Into an empty document it becomes the
    /// whole document.
    pub fn paste(&mut self, buffer: SampleBuffer, at: f64) -> Result<()> {
        let at_frame = self.frame_for(at);
        self.paste_at_frame(buffer, at_frame)
    }

    /// Insert `buffer` before frame `at_frame`.
    pub fn paste_at_frame(&mut self, buffer: SampleBuffer, at_frame: usize) -> Result<()> {
        let result = self.execute("Paste", EditCommand::Insert { at_frame, buffer });
        result.map_err(|e| self.reject("Paste", e))
    }

    /// Paste the clipboard contents at the cursor frame.
    pub fn paste_from_clipboard(&mut self) -> Result<()> {
        let fetched = fetch_buffer(self.clipboard.as_ref()).and_then(|clip| {
            clip.ok_or_else(|| WaveEditError::ClipboardUnavailable("clipboard is empty".into()))
        });
        match fetched {
            Ok(clip) => self.paste_at_frame(clip, self.cursor_frame),
            Err(e) => Err(self.reject("Paste", e)),
        }
    }

    /// Put `range` on the clipboard and return it. Does not modify the document.
    pub fn copy(&mut self, range: TimeRange) -> Result<SampleBuffer> {
        match self.span_for(range) {
            Ok(span) => self.copy_frames(span),
            Err(e) => Err(self.reject("Copy", e)),
        }
    }

    /// Put the frames in `span` on the clipboard and return them.
    pub fn copy_frames(&mut self, span: FrameSpan) -> Result<SampleBuffer> {
        let result = self.check_span(span).and_then(|span| self.copy_span(span));
        result.map_err(|e| self.reject("Copy", e))
    }

    pub fn copy_selection(&mut self) -> Result<SampleBuffer> {
        match self.require_selection() {
            Ok(span) => self.copy_frames(span),
            Err(e) => Err(self.reject("Copy", e)),
        }
    }

    /// Copy `range`, then delete it as one undoable "Cut".
    pub fn cut(&mut self, range: TimeRange) -> Result<()> {
        match self.span_for(range) {
            Ok(span) => self.cut_frames(span),
            Err(e) => Err(self.reject("Cut", e)),
        }
    }

    /// Move the frames in `span` to the clipboard as one undoable "Cut".
    pub fn cut_frames(&mut self, span: FrameSpan) -> Result<()> {
        let result = self.check_span(span).and_then(|span| self.cut_span(span));
        result.map_err(|e| self.reject("Cut", e))
    }

    pub fn cut_selection(&mut self) -> Result<()> {
        match self.require_selection() {
            Ok(span) => self.cut_frames(span),
            Err(e) => Err(self.reject("Cut", e)),
        }
    }

    // ---- History ----

    /// Reverse the most recent edit. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> Result<bool> {
        let Some(entry) = self.undo.pop_undo() else {
            return Ok(false);
        };
        match self.replay(&entry.command) {
            Ok(inverse) => {
                info!(action = %entry.action_name, "Undo");
                self.undo.push_redo(UndoEntry::new(entry.action_name, inverse));
                self.finish();
                Ok(true)
            }
            Err(e) => {
                self.undo.push_undo(entry);
                Err(self.reject("Undo", e))
            }
        }
    }

    /// Re-apply the most recently undone edit. Returns `false` when there is
    /// nothing to redo.
    pub fn redo(&mut self) -> Result<bool> {
        let Some(entry) = self.undo.pop_redo() else {
            return Ok(false);
        };
        match self.replay(&entry.command) {
            Ok(inverse) => {
                info!(action = %entry.action_name, "Redo");
                self.undo.push_undo(UndoEntry::new(entry.action_name, inverse));
                self.finish();
                Ok(true)
            }
            Err(e) => {
                self.undo.push_redo(entry);
                Err(self.reject("Redo", e))
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        self.undo.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.undo.can_redo()
    }

    pub fn undo_action_name(&self) -> Option<&str> {
        self.undo.undo_name()
    }

    pub fn redo_action_name(&self) -> Option<&str> {
        self.undo.redo_name()
    }

    // ---- Selection and view ----

    /// Set or clear the selection. The range is clamped to the document and
    /// a zero-width selection counts as none.
    pub fn set_selection(&mut self, range: Option<TimeRange>) {
        let span = match (range, self.buffer()) {
            (Some(range), Some(buffer)) => Some(
                range
                    .clamped(buffer.duration_secs())
                    .to_frames(buffer.sample_rate(), buffer.len_frames()),
            ),
            _ => None,
        };
        self.set_selection_frames(span);
    }

    /// Set or clear the selection in frames, clamped to the document.
    pub fn set_selection_frames(&mut self, span: Option<FrameSpan>) {
        let length = self.len_frames();
        self.selection = span
            .map(|s| FrameSpan::new(s.start.min(length), s.end.min(length)))
            .filter(|s| !s.is_empty());
        self.publish();
    }

    pub fn select_all(&mut self) {
        self.set_selection_frames(Some(FrameSpan::new(0, self.len_frames())));
    }

    /// Set the on-screen range. A degenerate range shows the whole document.
    pub fn set_visible_range(&mut self, range: TimeRange) {
        self.visible = self
            .document
            .as_ref()
            .map(|doc| fit_visible(Some(range), doc.duration()));
        self.publish();
    }

    // ---- Transport ----

    /// Move the cursor to `time`, clamped to the document. Restarts
    /// playback from there if it was running.
    pub fn seek(&mut self, time: f64) -> Result<()> {
        self.seek_frame(self.frame_for(time))
    }

    /// Move the cursor to `frame`, clamped to the document.
    pub fn seek_frame(&mut self, frame: usize) -> Result<()> {
        let was_playing = self.player.is_playing();
        self.player.stop();
        self.cursor_frame = frame.min(self.len_frames());
        let result = if was_playing {
            self.start_from_cursor()
        } else {
            Ok(())
        };
        self.publish();
        result.map_err(|e| self.reject("Play", e))
    }

    /// Step the cursor forward and drop the selection.
    pub fn forward(&mut self) -> Result<()> {
        self.selection = None;
        let frame = self.cursor_frame.saturating_add(self.seek_step_frames());
        self.seek_frame(frame)
    }

    /// Step the cursor backward and drop the selection.
    pub fn backward(&mut self) -> Result<()> {
        self.selection = None;
        let frame = self.cursor_frame.saturating_sub(self.seek_step_frames());
        self.seek_frame(frame)
    }

    pub fn forward_end(&mut self) -> Result<()> {
        self.selection = None;
        self.seek_frame(self.len_frames())
    }

    pub fn backward_end(&mut self) -> Result<()> {
        self.selection = None;
        self.seek_frame(0)
    }

    /// Toggle playback. Starting plays the selection if there is one,
    /// otherwise from the cursor to the end.
    pub fn play(&mut self) -> Result<()> {
        if self.player.is_playing() {
            self.player.stop();
            self.publish();
            return Ok(());
        }
        let result = match self.selection {
            Some(span) => self.start_selection(span),
            None => self.start_from_cursor(),
        };
        self.publish();
        result.map_err(|e| self.reject("Play", e))
    }

    pub fn stop(&mut self) {
        self.player.stop();
        self.publish();
    }

    /// Read the play head, moving the cursor with it. Returns `None` when
    /// not playing.
    pub fn poll_playback(&mut self) -> Option<PlaybackTick> {
        let tick = self.player.poll()?;
        self.cursor_frame = self.play_head_frame(tick.time);
        self.publisher.emit(EditorEvent::PlaybackPosition(self.cursor()));
        if tick.finished {
            self.publish();
        } else {
            let state = self.build_state();
            self.publisher.store(state);
        }
        Some(tick)
    }

    pub fn is_playing(&self) -> bool {
        self.player.is_playing()
    }

    pub fn player_state(&self) -> PlayerState {
        self.player.state()
    }

    // ---- Queries ----

    pub fn document(&self) -> Option<Arc<Document>> {
        self.document.clone()
    }

    pub fn buffer(&self) -> Option<&SampleBuffer> {
        self.document.as_deref().map(|doc| doc.buffer.as_ref())
    }

    pub fn duration(&self) -> f64 {
        self.document.as_ref().map_or(0.0, |doc| doc.duration())
    }

    /// Perceptual level at `time`; 0 outside the document.
    pub fn power_at(&self, time: f64) -> f32 {
        self.document.as_ref().map_or(0.0, |doc| doc.power_at(time))
    }

    /// Cursor time in seconds.
    pub fn cursor(&self) -> f64 {
        self.buffer()
            .map_or(0.0, |b| frame_to_seconds(self.cursor_frame, b.sample_rate()))
    }

    pub fn cursor_frame(&self) -> usize {
        self.cursor_frame
    }

    pub fn selection(&self) -> Option<TimeRange> {
        let rate = self.buffer()?.sample_rate();
        self.selection.map(|span| TimeRange::from_frames(span, rate))
    }

    pub fn selection_frames(&self) -> Option<FrameSpan> {
        self.selection
    }

    pub fn visible_range(&self) -> Option<TimeRange> {
        self.visible
    }

    pub fn engine_status(&self) -> EngineStatus {
        self.status
    }

    /// One-line summary such as `44.1 kHz | Stereo | 01:05`.
    pub fn status(&self) -> Option<String> {
        self.document.as_ref().map(|doc| doc.status_line())
    }

    /// Latest published state.
    pub fn state(&self) -> Arc<EditorState> {
        self.publisher.current()
    }

    pub fn snapshot_reader(&self) -> SnapshotReader {
        self.publisher.reader()
    }

    pub fn subscribe(&mut self) -> Receiver<EditorEvent> {
        self.publisher.subscribe()
    }

    // ---- Internals ----

    fn len_frames(&self) -> usize {
        self.buffer().map_or(0, SampleBuffer::len_frames)
    }

    fn require_selection(&self) -> Result<FrameSpan> {
        self.selection
            .ok_or_else(|| WaveEditError::InvalidParameter("nothing is selected".into()))
    }

    /// Frames covered by `range`, clamped to the document. Empty spans are rejected.
    fn span_for(&self, range: TimeRange) -> Result<FrameSpan> {
        let buffer = self.buffer().ok_or(WaveEditError::NotLoaded)?;
        let span = range
            .clamped(buffer.duration_secs())
            .to_frames(buffer.sample_rate(), buffer.len_frames());
        self.check_span(span)
    }

    /// `span` must be non-empty and lie inside the document.
    fn check_span(&self, span: FrameSpan) -> Result<FrameSpan> {
        let length = self.buffer().ok_or(WaveEditError::NotLoaded)?.len_frames();
        if span.is_empty() || span.end > length {
            return Err(WaveEditError::InvalidRange {
                start: span.start,
                end: span.end,
                length,
            });
        }
        Ok(span)
    }

    fn frame_for(&self, time: f64) -> usize {
        self.buffer().map_or(0, |b| b.frame_at(time))
    }

    fn seek_step_frames(&self) -> usize {
        self.buffer().map_or(0, |b| {
            seconds_to_frame(self.config.seek_step_secs, b.sample_rate())
        })
    }

    /// Play head times are computed from frame counts, so rounding recovers
    /// the frame exactly.
    fn play_head_frame(&self, time: f64) -> usize {
        match self.buffer() {
            Some(b) if time.is_finite() && time > 0.0 => {
                ((time * b.sample_rate()).round() as usize).min(b.len_frames())
            }
            _ => 0,
        }
    }

    fn copy_span(&mut self, span: FrameSpan) -> Result<SampleBuffer> {
        let buffer = self.buffer().ok_or(WaveEditError::NotLoaded)?;
        let clip = extract(buffer, span.start, span.end)?;
        publish_buffer(self.clipboard.as_mut(), &clip)?;
        debug!(frames = clip.len_frames(), "Copied to clipboard");
        Ok(clip)
    }

    /// The delete is built first and the clipboard written before it is
    /// installed. A failure at either step leaves the engine and the
    /// clipboard as they were.
    fn cut_span(&mut self, span: FrameSpan) -> Result<()> {
        let applied = self.prepare(&EditCommand::Delete { span })?;
        if let Some(removed) = applied.inverse.payload() {
            publish_buffer(self.clipboard.as_mut(), removed)?;
            debug!(frames = removed.len_frames(), "Cut to clipboard");
        }
        let inverse = self.commit(applied);
        info!(action = "Cut", "Edit applied");
        self.undo.record(UndoEntry::new("Cut", inverse));
        self.finish();
        Ok(())
    }

    /// Apply a new user edit and record its inverse.
    fn execute(&mut self, action: &str, command: EditCommand) -> Result<()> {
        let inverse = self.replay(&command)?;
        info!(action, "Edit applied");
        self.undo.record(UndoEntry::new(action, inverse));
        self.finish();
        Ok(())
    }

    /// Apply `command` and install the result. Returns the inverse. Leaves
    /// the engine in `Processing`.
    fn replay(&mut self, command: &EditCommand) -> Result<EditCommand> {
        let applied = self.prepare(command)?;
        Ok(self.commit(applied))
    }

    /// Stop playback, mark processing and build the result of `command`
    /// without installing it.
    fn prepare(&mut self, command: &EditCommand) -> Result<Applied> {
        if self.player.is_playing() {
            self.player.stop();
        }
        self.status = EngineStatus::Processing;
        self.publish();

        let current = self.document.as_deref().map(|doc| doc.buffer.as_ref());
        let applied = command.apply(current)?;
        debug!(delta = command.frame_delta(), "Command applied");
        Ok(applied)
    }

    fn commit(&mut self, applied: Applied) -> EditCommand {
        let Applied {
            buffer,
            inverse,
            selection,
            cursor_frame,
        } = applied;
        self.install(buffer, selection, cursor_frame);
        inverse
    }

    fn install(
        &mut self,
        buffer: Option<SampleBuffer>,
        selection: Option<FrameSpan>,
        cursor_frame: usize,
    ) {
        let Some(buffer) = buffer else {
            debug!("Document is now empty");
            self.document = None;
            self.selection = None;
            self.visible = None;
            self.cursor_frame = 0;
            return;
        };

        let length = buffer.len_frames();
        let document = Document::new(buffer, self.config.compression);
        let duration = document.duration();
        debug!(
            frames = length,
            envelope_points = document.envelope.len(),
            "Document replaced"
        );
        self.selection = selection.filter(|s| !s.is_empty() && s.end <= length);
        self.cursor_frame = cursor_frame.min(length);
        self.visible = Some(fit_visible(self.visible, duration));
        self.document = Some(Arc::new(document));
    }

    fn finish(&mut self) {
        self.status = EngineStatus::Ready;
        self.publish();
    }

    /// Log a rejected operation, restore `Ready` and notify subscribers.
    fn reject(&mut self, action: &str, error: WaveEditError) -> WaveEditError {
        warn!(action, error = %error, "Operation rejected");
        if self.status == EngineStatus::Processing {
            self.status = EngineStatus::Ready;
            self.publish();
        }
        self.publisher.emit(EditorEvent::Failed {
            action: action.to_string(),
            error: error.to_string(),
        });
        error
    }

    fn start_selection(&mut self, span: FrameSpan) -> Result<()> {
        let doc = Arc::clone(self.document.as_ref().ok_or(WaveEditError::NotLoaded)?);
        let buffer = &doc.buffer;
        if span.is_empty() || span.end > buffer.len_frames() {
            return self.start_from_cursor();
        }
        let segment = extract(buffer, span.start, span.end)?;
        self.player.start(
            Arc::new(segment),
            frame_to_seconds(span.start, buffer.sample_rate()),
        )
    }

    fn start_from_cursor(&mut self) -> Result<()> {
        let doc = Arc::clone(self.document.as_ref().ok_or(WaveEditError::NotLoaded)?);
        let buffer = &doc.buffer;
        let length = buffer.len_frames();
        if self.cursor_frame >= length {
            self.cursor_frame = 0;
        }
        let start = self.cursor_frame;
        let segment = if start == 0 {
            Arc::clone(buffer)
        } else {
            Arc::new(extract(buffer, start, length)?)
        };
        self.player
            .start(segment, frame_to_seconds(start, buffer.sample_rate()))
    }

    fn build_state(&self) -> EditorState {
        EditorState {
            document: self.document.clone(),
            selection: self.selection(),
            selection_frames: self.selection,
            visible: self.visible,
            cursor: self.cursor(),
            cursor_frame: self.cursor_frame,
            player: self.player.state(),
            status: self.status,
            can_undo: self.undo.can_undo(),
            can_redo: self.undo.can_redo(),
            undo_name: self.undo.undo_name().map(str::to_owned),
            redo_name: self.undo.redo_name().map(str::to_owned),
            revision: 0,
        }
    }

    fn publish(&mut self) {
        let state = self.build_state();
        self.publisher.publish(state);
    }
}

/// Clamp `range` into the document, falling back to all of it.
fn fit_visible(range: Option<TimeRange>, duration: f64) -> TimeRange {
    range
        .map(|r| r.clamped(duration))
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| TimeRange::full(duration))
}
