//! Integration tests for the background editor thread.

use crate::support::{ramp, range};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use wavecut_audio::NullOutput;
use wavecut_edit::{EditEngine, EditRequest, EditorConfig, EditorWorker, MemoryClipboard};

fn spawn() -> EditorWorker {
    let engine = EditEngine::new(
        EditorConfig::default(),
        Box::new(NullOutput),
        Box::new(MemoryClipboard::new()),
    )
    .unwrap();
    EditorWorker::spawn(engine).unwrap()
}

#[test]
fn readers_never_see_mismatched_envelope() {
    let worker = spawn();
    worker.submit(EditRequest::Load(ramp(20_000))).unwrap();

    let reader = worker.reader();
    let done = Arc::new(AtomicBool::new(false));
    let watcher = {
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let mut checked = 0usize;
            while !done.load(Ordering::Acquire) {
                if let Some(doc) = reader.document() {
                    let expected = doc.buffer.len_frames() / doc.envelope.compression;
                    assert_eq!(doc.envelope.len(), expected);
                    checked += 1;
                }
            }
            checked
        })
    };

    for i in 0..50 {
        let start = (i % 10) as f64;
        worker.submit(EditRequest::Delete(range(start, start + 0.5))).unwrap();
        worker.submit(EditRequest::Undo).unwrap();
    }
    let reader = worker.reader();
    worker.shutdown();
    done.store(true, Ordering::Release);
    watcher.join().unwrap();

    let doc = reader.document().unwrap();
    assert_eq!(doc.buffer.as_ref(), &ramp(20_000));
}

#[test]
fn queued_edits_apply_in_submission_order() {
    let worker = spawn();
    let reader = worker.reader();
    worker.submit(EditRequest::Load(ramp(1000))).unwrap();
    worker
        .submit(EditRequest::SetSelection(Some(range(1.0, 3.0))))
        .unwrap();
    worker.submit(EditRequest::CutSelection).unwrap();
    worker.submit(EditRequest::BackwardEnd).unwrap();
    worker.submit(EditRequest::PasteFromClipboard).unwrap();
    worker.shutdown();

    let state = reader.snapshot();
    let doc = state.document.as_ref().unwrap();
    let samples = doc.buffer.channel(0).unwrap();
    assert_eq!(samples.len(), 1000);
    assert_eq!(samples[0], 100.0);
    assert_eq!(samples[199], 299.0);
    assert_eq!(samples[200], 0.0);
    assert_eq!(state.selection, Some(range(0.0, 2.0)));
    assert_eq!(state.undo_name.as_deref(), Some("Paste"));
}

#[test]
fn dropping_the_handle_stops_the_thread() {
    let worker = spawn();
    let reader = worker.reader();
    let events = worker.subscribe().unwrap();
    worker.submit(EditRequest::Load(ramp(100))).unwrap();
    drop(worker);

    assert!(reader.snapshot().is_loaded());
    // The thread has exited, so the event channel is closed once drained.
    while events.recv_timeout(Duration::from_secs(1)).is_ok() {}
    assert!(events.recv().is_err());
}
