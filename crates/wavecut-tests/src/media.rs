//! Integration tests for decoding, editing and re-encoding files.

use crate::support::{engine, range, stereo_ramp};
use wavecut_core::{SampleBuffer, WaveEditError};
use wavecut_media::{AudioDecoder, EncodeSettings, SampleEncoding, WavDecoder, WavEncoder};

#[test]
fn edit_round_trips_through_wav() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.wav");
    let output = dir.path().join("output.wav");

    let (mut writer, _) = engine();
    writer.load(stereo_ramp(1000));
    writer
        .save(&WavEncoder, &input, &EncodeSettings::default())
        .unwrap();

    let (mut editor, _) = engine();
    let source = editor.open(&WavDecoder, &input).unwrap();
    assert_eq!(source.channels, 2);
    assert_eq!(source.sample_rate, 100);
    assert!((source.duration_secs - 10.0).abs() < 1e-9);

    editor.delete(range(0.0, 5.0)).unwrap();
    editor
        .save(&WavEncoder, &output, &EncodeSettings::default())
        .unwrap();

    let decoded = WavDecoder.decode(&output).unwrap();
    assert_eq!(decoded.buffer.len_frames(), 500);
    assert_eq!(decoded.buffer.channel(0).unwrap()[0], 500.0);
    assert_eq!(decoded.buffer.channel(1).unwrap()[0], -500.0);
}

#[test]
fn int16_output_is_normalized_on_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quiet.wav");
    let buffer =
        SampleBuffer::from_channels(8000.0, vec![vec![0.0, 0.25, -0.25, 0.5, -0.5]]).unwrap();

    let (mut engine, _) = engine();
    engine.load(buffer);
    let settings = EncodeSettings {
        encoding: SampleEncoding::Int16,
    };
    engine.save(&WavEncoder, &path, &settings).unwrap();

    let decoded = WavDecoder.decode(&path).unwrap();
    assert_eq!(decoded.source.bits_per_sample, 16);
    assert!(!decoded.source.is_float);
    let samples = decoded.buffer.channel(0).unwrap();
    for (got, want) in samples.iter().zip([0.0, 0.25, -0.25, 0.5, -0.5]) {
        assert!((got - want).abs() < 1e-3, "{got} vs {want}");
    }
}

#[test]
fn open_failure_leaves_document_alone() {
    let dir = tempfile::tempdir().unwrap();
    let bogus = dir.path().join("bogus.wav");
    std::fs::write(&bogus, b"definitely not RIFF").unwrap();

    let (mut engine, _) = engine();
    engine.load(stereo_ramp(10));
    let err = engine.open(&WavDecoder, &bogus).unwrap_err();
    assert!(matches!(err, WaveEditError::Decode(_)));
    assert_eq!(engine.buffer().unwrap(), &stereo_ramp(10));

    let missing = engine.open(&WavDecoder, &dir.path().join("missing.wav"));
    assert!(missing.is_err());
}
