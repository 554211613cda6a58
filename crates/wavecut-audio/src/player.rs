//! Playback transport over an `AudioOutput`.
//!
//! The player does not poll on its own. Callers query [`Player::poll`] at
//! whatever cadence their renderer runs; each poll reads the output's
//! clock and stops playback once the segment end is reached.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};
use wavecut_core::{Result, SampleBuffer, WaveEditError};

use crate::output::AudioOutput;

/// Transport state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlayerState {
    #[default]
    Stopped,
    Playing,
}

/// One position reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackTick {
    /// Document time of the play head in seconds.
    pub time: f64,
    /// True when this reading ended playback.
    pub finished: bool,
}

/// Plays one segment at a time through an output.
pub struct Player {
    output: Box<dyn AudioOutput>,
    state: PlayerState,
    /// Document time the scheduled segment starts at.
    seek_time: f64,
    /// Document time playback stops at.
    end_time: f64,
    sample_rate: f64,
    completed: Arc<AtomicBool>,
}

impl Player {
    pub fn new(output: Box<dyn AudioOutput>) -> Self {
        Self {
            output,
            state: PlayerState::Stopped,
            seek_time: 0.0,
            end_time: 0.0,
            sample_rate: 1.0,
            completed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlayerState::Playing
    }

    /// Schedule `segment`, which begins at document time `seek_time`, and start
    /// the output. If the output fails to start, playback is left stopped.
    pub fn start(&mut self, segment: Arc<SampleBuffer>, seek_time: f64) -> Result<()> {
        if self.is_playing() {
            self.stop();
        }

        self.sample_rate = segment.sample_rate();
        self.seek_time = seek_time;
        self.end_time = seek_time + segment.duration_secs();
        self.completed = Arc::new(AtomicBool::new(false));

        let completed = Arc::clone(&self.completed);
        let frames = segment.len_frames();
        let started = self
            .output
            .schedule(
                segment,
                Box::new(move || completed.store(true, Ordering::Release)),
            )
            .and_then(|()| self.output.start());

        if let Err(e) = started {
            warn!(error = %e, "Audio output failed to start");
            self.output.stop();
            self.state = PlayerState::Stopped;
            return Err(match e {
                WaveEditError::Playback(_) => e,
                other => WaveEditError::Playback(other.to_string()),
            });
        }

        self.state = PlayerState::Playing;
        info!(seek_time, frames, "Playback started");
        Ok(())
    }

    /// Stop the output.
    pub fn stop(&mut self) {
        if self.state == PlayerState::Playing {
            info!("Playback stopped");
        }
        self.output.stop();
        self.state = PlayerState::Stopped;
    }

    /// Read the current position. Returns `None` when stopped.
    pub fn poll(&mut self) -> Option<PlaybackTick> {
        if !self.is_playing() {
            return None;
        }
        let played = self.output.current_played_frame().max(0);
        let time = self.seek_time + played as f64 / self.sample_rate;

        if time >= self.end_time || self.completed.load(Ordering::Acquire) {
            debug!(time, end = self.end_time, "Playback reached segment end");
            self.stop();
            return Some(PlaybackTick {
                time: self.end_time,
                finished: true,
            });
        }
        Some(PlaybackTick {
            time,
            finished: false,
        })
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.output.stop();
    }
}
