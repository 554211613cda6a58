//! Clipboard interchange.
//!
//! The system clipboard is an external collaborator. The engine only needs
//! somewhere to put an encoded clip and somewhere to read one back, so the
//! store is injected; tests use `MemoryClipboard`.

use parking_lot::Mutex;
use std::sync::Arc;
use wavecut_core::clip::{decode_clip, encode_clip};
use wavecut_core::{Result, SampleBuffer};

/// Byte store backing copy/paste.
pub trait ClipboardStore: Send {
    /// Replace the clipboard contents.
    fn publish(&mut self, payload: Vec<u8>) -> Result<()>;

    /// Current contents, if any.
    fn fetch(&self) -> Result<Option<Vec<u8>>>;
}

/// Encode `buffer` and publish it.
pub fn publish_buffer(store: &mut dyn ClipboardStore, buffer: &SampleBuffer) -> Result<()> {
    store.publish(encode_clip(buffer)?)
}

/// Fetch and decode the clipboard; `Ok(None)` when it is empty.
pub fn fetch_buffer(store: &dyn ClipboardStore) -> Result<Option<SampleBuffer>> {
    store.fetch()?.map(|bytes| decode_clip(&bytes)).transpose()
}

/// In-process clipboard. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    slot: Arc<Mutex<Option<Vec<u8>>>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put raw bytes on the clipboard, bypassing the encoder.
    pub fn set_raw(&self, payload: Vec<u8>) {
        *self.slot.lock() = Some(payload);
    }

    pub fn is_empty(&self) -> bool {
        self.slot.lock().is_none()
    }
}

impl ClipboardStore for MemoryClipboard {
    fn publish(&mut self, payload: Vec<u8>) -> Result<()> {
        *self.slot.lock() = Some(payload);
        Ok(())
    }

    fn fetch(&self) -> Result<Option<Vec<u8>>> {
        Ok(self.slot.lock().clone())
    }
}
