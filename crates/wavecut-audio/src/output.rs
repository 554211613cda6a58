//! Audio output abstraction.
//!
//! Device I/O lives outside this workspace. The editor talks to an output
//! through `AudioOutput`: schedule one buffer, start, stop, and query how
//! many frames of the scheduled buffer have been rendered.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use wavecut_core::{Result, SampleBuffer, WaveEditError};

/// Called once when a scheduled buffer has been fully rendered.
pub type CompletionHandler = Box<dyn FnOnce() + Send + 'static>;

/// An output device that can render a scheduled buffer.
pub trait AudioOutput: Send {
    /// Queue `buffer` for rendering. Replaces anything previously scheduled.
    fn schedule(&mut self, buffer: Arc<SampleBuffer>, on_complete: CompletionHandler) -> Result<()>;

    /// Begin rendering the scheduled buffer.
    fn start(&mut self) -> Result<()>;

    /// Stop rendering and drop the scheduled buffer.
    fn stop(&mut self);

    /// Frames of the scheduled buffer rendered since `start`.
    fn current_played_frame(&self) -> i64;
}

/// An output that accepts everything and never renders. For headless use.
#[derive(Debug, Default)]
pub struct NullOutput;

impl AudioOutput for NullOutput {
    fn schedule(&mut self, _buffer: Arc<SampleBuffer>, _on_complete: CompletionHandler) -> Result<()> {
        Ok(())
    }

    fn start(&mut self) -> Result<()> {
        Ok(())
    }

    fn stop(&mut self) {}

    fn current_played_frame(&self) -> i64 {
        0
    }
}

#[derive(Default)]
struct SimulatedState {
    scheduled_frames: i64,
    on_complete: Option<CompletionHandler>,
}

/// Shared state behind a `SimulatedOutput` and its `SimulatedClock`.
#[derive(Default)]
struct SimulatedShared {
    played: AtomicI64,
    running: AtomicBool,
    fail_start: AtomicBool,
    state: Mutex<SimulatedState>,
}

/// A software output whose clock is advanced by hand.
///
/// Rendering progress is driven through the paired [`SimulatedClock`],
/// which makes playback deterministic in tests and offline tools.
pub struct SimulatedOutput {
    shared: Arc<SimulatedShared>,
}

/// Handle that advances a `SimulatedOutput`.
#[derive(Clone)]
pub struct SimulatedClock {
    shared: Arc<SimulatedShared>,
}

impl SimulatedOutput {
    /// Create an output and the clock that drives it.
    pub fn new() -> (Self, SimulatedClock) {
        let shared = Arc::new(SimulatedShared::default());
        (
            Self {
                shared: Arc::clone(&shared),
            },
            SimulatedClock { shared },
        )
    }
}

impl SimulatedClock {
    /// Render `frames` more frames. Fires the completion handler once the
    /// scheduled buffer is exhausted.
    pub fn advance(&self, frames: i64) {
        if !self.shared.running.load(Ordering::Acquire) {
            return;
        }
        let mut state = self.shared.state.lock();
        let played = (self.shared.played.load(Ordering::Acquire) + frames)
            .min(state.scheduled_frames);
        self.shared.played.store(played, Ordering::Release);
        let finished = if played >= state.scheduled_frames {
            self.shared.running.store(false, Ordering::Release);
            state.on_complete.take()
        } else {
            None
        };
        drop(state);
        if let Some(done) = finished {
            done();
        }
    }

    /// Make the next `start` fail, as a device that cannot open would.
    pub fn fail_next_start(&self) {
        self.shared.fail_start.store(true, Ordering::Release);
    }

    /// Whether the output is currently rendering.
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }
}

impl AudioOutput for SimulatedOutput {
    fn schedule(&mut self, buffer: Arc<SampleBuffer>, on_complete: CompletionHandler) -> Result<()> {
        let mut state = self.shared.state.lock();
        state.scheduled_frames = buffer.len_frames() as i64;
        state.on_complete = Some(on_complete);
        self.shared.played.store(0, Ordering::Release);
        Ok(())
    }

    fn start(&mut self) -> Result<()> {
        if self.shared.fail_start.swap(false, Ordering::AcqRel) {
            return Err(WaveEditError::Playback("simulated device failed to start".into()));
        }
        self.shared.running.store(true, Ordering::Release);
        Ok(())
    }

    fn stop(&mut self) {
        self.shared.running.store(false, Ordering::Release);
        self.shared.state.lock().on_complete = None;
    }

    fn current_played_frame(&self) -> i64 {
        self.shared.played.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_second() -> Arc<SampleBuffer> {
        Arc::new(SampleBuffer::from_channels(100.0, vec![vec![0.0; 100]]).unwrap())
    }

    #[test]
    fn test_simulated_clock_fires_completion_once() {
        let (mut output, clock) = SimulatedOutput::new();
        let done = Arc::new(AtomicI64::new(0));
        let counter = Arc::clone(&done);
        output
            .schedule(
                one_second(),
                Box::new(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .unwrap();
        output.start().unwrap();

        clock.advance(60);
        assert_eq!(output.current_played_frame(), 60);
        assert_eq!(done.load(Ordering::SeqCst), 0);

        clock.advance(60);
        assert_eq!(output.current_played_frame(), 100);
        assert_eq!(done.load(Ordering::SeqCst), 1);
        assert!(!clock.is_running());

        clock.advance(10);
        assert_eq!(done.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_clock_ignored_until_started() {
        let (mut output, clock) = SimulatedOutput::new();
        output.schedule(one_second(), Box::new(|| {})).unwrap();
        clock.advance(50);
        assert_eq!(output.current_played_frame(), 0);
    }

    #[test]
    fn test_fail_next_start() {
        let (mut output, clock) = SimulatedOutput::new();
        clock.fail_next_start();
        assert!(matches!(output.start(), Err(WaveEditError::Playback(_))));
        assert!(output.start().is_ok());
    }

    #[test]
    fn test_null_output() {
        let mut output = NullOutput;
        output.schedule(one_second(), Box::new(|| {})).unwrap();
        output.start().unwrap();
        assert_eq!(output.current_played_frame(), 0);
        output.stop();
    }
}
