// WHY: stand-in media clock for environments without an audio/video device
// Position advances on the tokio clock, so paused-time tests drive it deterministically

use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::time::Instant;

use super::MediaResource;
use crate::error::MediaError;

#[derive(Debug)]
struct SimState {
    ready: bool,
    playing: bool,
    base_position: f64,
    started_at: Option<Instant>,
    duration: Option<f64>,
    fail_next_play: Option<String>,
    play_calls: usize,
    pause_calls: usize,
}

impl SimState {
    fn position(&self) -> f64 {
        let elapsed = match (self.playing, self.started_at) {
            (true, Some(started)) => started.elapsed().as_secs_f64(),
            _ => 0.0,
        };
        let position = self.base_position + elapsed;
        match self.duration {
            Some(duration) => position.min(duration),
            None => position,
        }
    }
}

/// Media that plays silence in real (or virtual) time
#[derive(Debug)]
pub struct SimulatedMedia {
    state: Mutex<SimState>,
}

impl SimulatedMedia {
    /// Ready media of the given total length (`None` for unbounded)
    pub fn new(duration: Option<f64>) -> Self {
        Self {
            state: Mutex::new(SimState {
                ready: true,
                playing: false,
                base_position: 0.0,
                started_at: None,
                duration,
                fail_next_play: None,
                play_calls: 0,
                pause_calls: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_ready(&self, ready: bool) {
        self.lock().ready = ready;
    }

    /// Make the next `play` call fail with `reason`, as an autoplay policy would
    pub fn fail_next_play(&self, reason: impl Into<String>) {
        self.lock().fail_next_play = Some(reason.into());
    }

    pub fn is_playing(&self) -> bool {
        self.lock().playing
    }

    /// True while playing when the position has reached the media duration
    pub fn has_ended(&self) -> bool {
        let state = self.lock();
        matches!(state.duration, Some(duration) if state.position() >= duration)
    }

    pub fn play_calls(&self) -> usize {
        self.lock().play_calls
    }

    pub fn pause_calls(&self) -> usize {
        self.lock().pause_calls
    }
}

impl MediaResource for SimulatedMedia {
    fn is_ready(&self) -> bool {
        self.lock().ready
    }

    fn position(&self) -> f64 {
        self.lock().position()
    }

    fn seek(&self, seconds: f64) {
        let mut state = self.lock();
        let mut target = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
        if let Some(duration) = state.duration {
            target = target.min(duration);
        }
        state.base_position = target;
        if state.playing {
            state.started_at = Some(Instant::now());
        }
    }

    fn play(&self) -> Result<(), MediaError> {
        let mut state = self.lock();
        if !state.ready {
            return Err(MediaError::NotReady);
        }
        if let Some(reason) = state.fail_next_play.take() {
            return Err(MediaError::Rejected(reason));
        }
        if !state.playing {
            state.playing = true;
            state.started_at = Some(Instant::now());
        }
        state.play_calls += 1;
        Ok(())
    }

    fn pause(&self) {
        let mut state = self.lock();
        state.base_position = state.position();
        state.playing = false;
        state.started_at = None;
        state.pause_calls += 1;
    }
}
