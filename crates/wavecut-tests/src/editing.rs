//! Integration tests for editing and undo through `EditEngine`.

use crate::support::{engine, ramp, range, stereo_ramp, RATE};
use wavecut_audio::NullOutput;
use wavecut_core::ops::{concatenate, extract};
use wavecut_core::{SampleBuffer, WaveEditError};
use wavecut_edit::{EditEngine, EditorConfig, EditorEvent};

#[test]
fn delete_then_undo_restores_every_channel() {
    let (mut engine, _) = engine();
    let original = stereo_ramp(1000);
    engine.load(original.clone());

    for (start, end) in [(0.0, 1.0), (2.37, 5.91), (9.5, 10.0)] {
        engine.delete(range(start, end)).unwrap();
        assert!(engine.undo().unwrap());
        assert_eq!(engine.buffer().unwrap(), &original);
    }
}

#[test]
fn paste_then_undo_restores_exactly() {
    let (mut engine, _) = engine();
    let original = stereo_ramp(1000);
    engine.load(original.clone());

    for at in [0.0, 0.01, 4.444, 10.0] {
        engine.paste(stereo_ramp(37), at).unwrap();
        assert_eq!(engine.buffer().unwrap().len_frames(), 1037);
        assert!(engine.undo().unwrap());
        assert_eq!(engine.buffer().unwrap(), &original);
    }
}

#[test]
fn split_and_concatenate_is_identity() {
    let buffer = stereo_ramp(500);
    for k in [1, 250, 499] {
        let head = extract(&buffer, 0, k).unwrap();
        let tail = extract(&buffer, k, 500).unwrap();
        assert_eq!(concatenate(&[&head, &tail]).unwrap(), buffer);
    }
}

#[test]
fn paste_of_different_format_is_rejected() {
    let (mut engine, _) = engine();
    engine.load(ramp(1000));

    let other_rate = SampleBuffer::from_channels(RATE * 2.0, vec![vec![0.5; 10]]).unwrap();
    let other_layout = stereo_ramp(10);
    for clip in [other_rate, other_layout] {
        let err = engine.paste(clip, 1.0).unwrap_err();
        assert!(matches!(err, WaveEditError::FormatMismatch { .. }));
        assert_eq!(engine.buffer().unwrap(), &ramp(1000));
        assert!(!engine.can_undo());
    }
}

#[test]
fn undo_history_is_bounded() {
    let config = EditorConfig {
        undo_depth: 4,
        ..EditorConfig::default()
    };
    let mut engine = EditEngine::new(
        config,
        Box::new(NullOutput),
        Box::new(wavecut_edit::MemoryClipboard::new()),
    )
    .unwrap();
    engine.load(ramp(1000));

    for _ in 0..9 {
        engine.delete(range(0.0, 0.5)).unwrap();
    }
    for _ in 0..4 {
        assert!(engine.can_undo());
        engine.undo().unwrap();
    }
    assert!(!engine.can_undo());
    assert!(!engine.undo().unwrap());
    assert_eq!(engine.buffer().unwrap().len_frames(), 1000 - 5 * 50);
}

#[test]
fn scenario_delete_middle() {
    let (mut engine, _) = engine();
    let original = ramp(1000);
    engine.load(original.clone());
    engine.delete(range(4.0, 6.0)).unwrap();

    let edited = engine.buffer().unwrap();
    assert_eq!(edited.len_frames(), 800);
    assert!((edited.duration_secs() - 8.0).abs() < 1e-9);
    let samples = edited.channel(0).unwrap();
    let source = original.channel(0).unwrap();
    assert_eq!(&samples[..400], &source[..400]);
    assert_eq!(&samples[400..], &source[600..]);
}

#[test]
fn scenario_paste_into_empty_document() {
    let (mut engine, _) = engine();
    assert!(engine.document().is_none());

    engine.paste(ramp(200), 0.0).unwrap();
    assert_eq!(engine.duration(), 2.0);
    assert_eq!(engine.selection(), Some(range(0.0, 2.0)));
    assert_eq!(engine.undo_action_name(), Some("Paste"));
}

#[test]
fn scenario_cut_then_undo_restores_selection() {
    let (mut engine, clipboard) = engine();
    let original = ramp(1000);
    engine.load(original.clone());
    engine.set_selection(Some(range(1.0, 3.0)));

    engine.cut_selection().unwrap();
    assert_eq!(engine.duration(), 8.0);
    assert!(!clipboard.is_empty());

    engine.undo().unwrap();
    assert_eq!(engine.duration(), 10.0);
    assert_eq!(engine.selection(), Some(range(1.0, 3.0)));
    let restored = engine.buffer().unwrap().channel(0).unwrap();
    assert_eq!(&restored[100..300], &original.channel(0).unwrap()[100..300]);
}

#[test]
fn clipboard_carries_audio_between_engines() {
    let (mut source, clipboard) = engine();
    source.load(stereo_ramp(1000));
    let copied = source.copy(range(2.0, 2.5)).unwrap();

    let mut target = EditEngine::new(
        EditorConfig::default(),
        Box::new(NullOutput),
        Box::new(clipboard),
    )
    .unwrap();
    target.paste_from_clipboard().unwrap();
    assert_eq!(target.buffer().unwrap(), &copied);
    assert_eq!(source.buffer().unwrap().len_frames(), 1000);
}

#[test]
fn whole_buffer_delete_empties_and_undoes() {
    let (mut engine, _) = engine();
    engine.load(ramp(300));
    let events = engine.subscribe();

    engine.delete(range(0.0, 3.0)).unwrap();
    assert!(engine.document().is_none());
    assert_eq!(engine.duration(), 0.0);
    assert_eq!(engine.power_at(0.0), 0.0);

    let last = events
        .try_iter()
        .filter_map(|e| match e {
            EditorEvent::StateChanged(state) => Some(state),
            _ => None,
        })
        .last()
        .unwrap();
    assert!(!last.is_loaded());
    assert!(last.can_undo);

    engine.undo().unwrap();
    assert_eq!(engine.buffer().unwrap(), &ramp(300));
}

#[test]
fn redo_replays_after_undo() {
    let (mut engine, _) = engine();
    engine.load(ramp(1000));
    engine.delete(range(1.0, 2.0)).unwrap();
    engine.paste(ramp(10), 0.0).unwrap();
    let after = engine.buffer().unwrap().clone();

    engine.undo().unwrap();
    engine.undo().unwrap();
    assert_eq!(engine.buffer().unwrap(), &ramp(1000));
    assert_eq!(engine.redo_action_name(), Some("Delete"));

    engine.redo().unwrap();
    engine.redo().unwrap();
    assert_eq!(engine.buffer().unwrap(), &after);
    assert!(!engine.can_redo());
}

#[test]
fn failed_edit_reports_and_keeps_state() {
    let (mut engine, _) = engine();
    engine.load(ramp(100));
    let before = engine.state();
    let events = engine.subscribe();

    assert!(engine.delete_selection().is_err());
    assert!(engine.cut(range(5.0, 6.0)).is_err());

    let failures: Vec<String> = events
        .try_iter()
        .filter_map(|e| match e {
            EditorEvent::Failed { action, .. } => Some(action),
            _ => None,
        })
        .collect();
    assert_eq!(failures, vec!["Delete".to_string(), "Cut".to_string()]);
    assert_eq!(engine.buffer(), before.document.as_ref().map(|d| d.buffer.as_ref()));
}

#[test]
fn cut_and_paste_back_is_identity_at_odd_frames() {
    let (mut engine, _) = engine();
    let original = stereo_ramp(1000);
    engine.load(original.clone());

    for (start, end) in [(0.295, 0.5), (0.07, 0.13), (5.57, 9.99)] {
        engine.cut(range(start, end)).unwrap();
        engine.paste_from_clipboard().unwrap();
        assert_eq!(engine.buffer().unwrap(), &original, "cut [{start}, {end})");
    }
}

#[test]
fn selection_survives_undo_frame_for_frame() {
    let (mut engine, _) = engine();
    engine.load(ramp(1000));
    engine.cut(range(0.295, 0.5)).unwrap();
    engine.undo().unwrap();

    let state = engine.state();
    let span = state.selection_frames.unwrap();
    assert_eq!((span.start, span.end), (29, 50));

    let clip = engine.copy_selection().unwrap();
    assert_eq!(clip.len_frames(), 21);
    assert_eq!(clip.channel(0).unwrap()[0], 29.0);
}
