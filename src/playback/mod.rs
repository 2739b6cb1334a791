// WHY: bounded, repeatable playback of one sentence's interval of a continuous media stream
// The media itself is an opaque capability supplied by the embedding application

use serde::{Deserialize, Serialize};

use crate::error::MediaError;

pub mod controller;
pub mod simulated;

pub use controller::SegmentPlaybackController;
pub use simulated::SimulatedMedia;

/// A playback request: `[start, end)` in seconds, or to the natural end when `end` is `None`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: f64,
    pub end: Option<f64>,
}

impl Segment {
    pub fn bounded(start: f64, end: f64) -> Self {
        Self { start, end: Some(end) }
    }

    pub fn open_ended(start: f64) -> Self {
        Self { start, end: None }
    }

    /// Finite stop point, if any
    pub fn boundary(&self) -> Option<f64> {
        self.end.filter(|end| end.is_finite())
    }
}

/// Seekable media capability
///
/// Methods take `&self` because the boundary watch shares the handle with the
/// controller; implementations provide their own interior synchronization.
pub trait MediaResource: Send + Sync + 'static {
    /// True once the media signalled it can play
    fn is_ready(&self) -> bool;
    /// Current position in seconds
    fn position(&self) -> f64;
    fn seek(&self, seconds: f64);
    fn play(&self) -> Result<(), MediaError>;
    fn pause(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    Idle,
    SeekingToStart,
    Playing,
    WaitingForBoundary,
    Completed,
}

/// Signals emitted by the controller
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    /// The segment of play request `generation` finished, by boundary or by natural end
    Completed { generation: u64, segment: Segment },
}
