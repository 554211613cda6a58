//! Wavecut Edit - The stateful editing core
//!
//! Implements the document model for waveform editing:
//! - Reversible edit commands (delete / insert) over sample buffers
//! - A bounded undo/redo history
//! - `EditEngine`: selection, cursor, clipboard and playback around the current buffer
//! - `EditorWorker`: runs the engine on a background thread with atomic snapshots

pub mod clipboard;
pub mod command;
pub mod config;
pub mod engine;
pub mod state;
pub mod undo;
pub mod worker;

pub use clipboard::{ClipboardStore, MemoryClipboard};
pub use command::{Applied, EditCommand};
pub use config::EditorConfig;
pub use engine::EditEngine;
pub use state::{Document, EditorEvent, EditorState, EngineStatus, SnapshotReader};
pub use undo::{UndoEntry, UndoStack};
pub use worker::{EditRequest, EditorWorker};
