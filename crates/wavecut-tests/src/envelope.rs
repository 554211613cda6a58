//! Integration tests for waveform envelopes and level queries.

use crate::support::{engine, range};
use wavecut_audio::{CompressionStrategy, WaveformEnvelope};
use wavecut_core::SampleBuffer;

fn tone(frames: usize, rate: f64) -> SampleBuffer {
    let samples = (0..frames)
        .map(|i| (i as f32 * 0.05).sin() * 0.8)
        .collect();
    SampleBuffer::from_channels(rate, vec![samples]).unwrap()
}

#[test]
fn envelope_length_shrinks_with_compression() {
    let buffer = tone(10_007, 1000.0);
    let mut previous = usize::MAX;
    for factor in [1, 2, 3, 10, 64, 1000, 20_000] {
        let envelope = WaveformEnvelope::summarize(&buffer, factor);
        assert_eq!(envelope.len(), 10_007 / factor);
        assert!(envelope.len() <= previous);
        assert!(envelope.len() <= buffer.len_frames());
        previous = envelope.len();
    }
}

#[test]
fn power_stays_in_unit_range() {
    let mut samples = vec![0.0f32, 1e-9, 0.001, 0.5, 1.0, 4.0, -3.0];
    samples.extend(std::iter::repeat(0.25).take(100));
    let buffer = SampleBuffer::from_channels(10.0, vec![samples]).unwrap();
    let envelope = WaveformEnvelope::summarize(&buffer, 1);

    for i in 0..200 {
        let power = envelope.power_at(i as f64 * 0.05);
        assert!((0.0..=1.0).contains(&power), "power {power} at step {i}");
    }
    assert_eq!(envelope.power_at(0.0), 0.0);
    assert_eq!(envelope.power_at(0.45), 1.0);
    assert_eq!(envelope.power_at(-1.0), 0.0);
    assert_eq!(envelope.power_at(1e9), 0.0);
    assert_eq!(envelope.power_at(f64::NAN), 0.0);
}

#[test]
fn envelope_follows_every_edit() {
    let (mut engine, _) = engine();
    engine.load(tone(8000, 1000.0));
    let strategy = CompressionStrategy::default();

    engine.delete(range(1.0, 3.0)).unwrap();
    let doc = engine.document().unwrap();
    assert_eq!(
        doc.envelope,
        WaveformEnvelope::summarize_with(&doc.buffer, strategy)
    );
    assert_eq!(doc.envelope.len(), 60);

    engine.undo().unwrap();
    let doc = engine.document().unwrap();
    assert_eq!(doc.envelope.len(), 80);
    assert!((doc.envelope.sample_rate - 10.0).abs() < 1e-9);
}

#[test]
fn power_query_past_end_is_silent() {
    let (mut engine, _) = engine();
    engine.load(tone(2000, 1000.0));
    assert!(engine.power_at(0.5) > 0.0);
    assert_eq!(engine.power_at(2.5), 0.0);
    engine.delete(range(1.0, 2.0)).unwrap();
    assert_eq!(engine.power_at(1.5), 0.0);
}
