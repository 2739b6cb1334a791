// WHY: plays `[start, end)` of a shared media handle and stops precisely at `end`
//
// Native time-update notifications are too coarse for sentence boundaries, so a
// polling watch checks the position at a fixed interval. Every play request gets
// a new generation number; a watch only acts while its generation is current,
// and the seek/play/watch sequence runs under one lock, so a watch installed for
// segment A can never pause or complete segment B.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::{MediaResource, PlaybackEvent, PlaybackState, Segment};
use crate::error::PlaybackError;

#[derive(Debug)]
struct ControllerInner {
    state: PlaybackState,
    active: Option<Segment>,
    last_segment: Option<Segment>,
    generation: u64,
    watch: Option<JoinHandle<()>>,
}

impl ControllerInner {
    fn cancel_watch(&mut self) {
        if let Some(watch) = self.watch.take() {
            watch.abort();
        }
    }
}

/// Segment playback state machine over one media handle
///
/// `play_segment` spawns the boundary watch onto the current Tokio runtime and
/// must be called from within one.
pub struct SegmentPlaybackController<M: MediaResource> {
    media: Arc<M>,
    inner: Arc<Mutex<ControllerInner>>,
    poll_interval: Duration,
    events: mpsc::UnboundedSender<PlaybackEvent>,
}

fn lock_inner(inner: &Mutex<ControllerInner>) -> MutexGuard<'_, ControllerInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<M: MediaResource> SegmentPlaybackController<M> {
    /// Create a controller and the receiver its completion events are delivered on
    pub fn new(
        media: Arc<M>,
        poll_interval: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<PlaybackEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let controller = Self {
            media,
            inner: Arc::new(Mutex::new(ControllerInner {
                state: PlaybackState::Idle,
                active: None,
                last_segment: None,
                generation: 0,
                watch: None,
            })),
            poll_interval: poll_interval.max(Duration::from_millis(1)),
            events,
        };
        (controller, receiver)
    }

    pub fn media(&self) -> &Arc<M> {
        &self.media
    }

    pub fn state(&self) -> PlaybackState {
        lock_inner(&self.inner).state
    }

    pub fn last_segment(&self) -> Option<Segment> {
        lock_inner(&self.inner).last_segment
    }

    /// Generation of the most recent play request or cancellation
    pub fn generation(&self) -> u64 {
        lock_inner(&self.inner).generation
    }

    /// True when an event tagged `generation` still belongs to the current request
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation() == generation
    }

    /// Seek to `segment.start`, play, and stop at `segment.end`
    ///
    /// Any previous boundary watch is cancelled first. Failures leave the
    /// controller `Idle` with the media paused and are returned to the caller.
    ///
    /// `last_segment` is recorded once the media is ready, before `play` is
    /// attempted, so `replay_last` after a start failure retries the same segment.
    pub fn play_segment(&self, segment: Segment) -> Result<u64, PlaybackError> {
        let mut inner = lock_inner(&self.inner);
        let was_active = inner.active.is_some();
        inner.cancel_watch();
        inner.generation += 1;
        inner.active = None;
        let generation = inner.generation;

        if !self.media.is_ready() {
            inner.state = PlaybackState::Idle;
            if was_active {
                self.media.pause();
            }
            warn!(start = segment.start, "Segment requested before media is ready");
            return Err(PlaybackError::NotReady);
        }

        inner.state = PlaybackState::SeekingToStart;
        inner.last_segment = Some(segment);
        self.media.seek(segment.start);

        if let Err(e) = self.media.play() {
            inner.state = PlaybackState::Idle;
            if was_active {
                self.media.pause();
            }
            warn!(start = segment.start, error = %e, "Media rejected playback");
            return Err(e.into());
        }

        inner.state = PlaybackState::Playing;
        inner.active = Some(segment);
        info!(generation, start = segment.start, end = ?segment.end, "Playing segment");

        if let Some(end) = segment.boundary() {
            inner.state = PlaybackState::WaitingForBoundary;
            inner.watch = Some(self.spawn_boundary_watch(generation, segment, end));
        }

        Ok(generation)
    }

    fn spawn_boundary_watch(&self, generation: u64, segment: Segment, end: f64) -> JoinHandle<()> {
        let media = Arc::clone(&self.media);
        let inner = Arc::clone(&self.inner);
        let events = self.events.clone();
        let poll_interval = self.poll_interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                let mut guard = lock_inner(&inner);
                if guard.generation != generation {
                    debug!(generation, "Boundary watch superseded");
                    return;
                }
                if media.position() < end {
                    continue;
                }

                media.pause();
                guard.state = PlaybackState::Completed;
                guard.active = None;
                guard.watch = None;
                drop(guard);

                debug!(generation, end, "Segment boundary reached");
                let _ = events.send(PlaybackEvent::Completed { generation, segment });
                return;
            }
        })
    }

    /// Play the most recent segment again; `Ok(None)` when nothing was played yet
    pub fn replay_last(&self) -> Result<Option<u64>, PlaybackError> {
        match self.last_segment() {
            Some(segment) => self.play_segment(segment).map(Some),
            None => Ok(None),
        }
    }

    /// Forward the media's own end-of-media notification
    ///
    /// Completes the active request when it is still playing; otherwise ignored.
    pub fn media_ended(&self) {
        let mut inner = lock_inner(&self.inner);
        if !matches!(inner.state, PlaybackState::Playing | PlaybackState::WaitingForBoundary) {
            return;
        }
        let Some(segment) = inner.active.take() else {
            return;
        };
        inner.cancel_watch();
        inner.state = PlaybackState::Completed;
        let generation = inner.generation;
        drop(inner);

        debug!(generation, "Media reached its natural end");
        let _ = self.events.send(PlaybackEvent::Completed { generation, segment });
    }

    /// Cancel the watch and pause; pending completions become stale
    pub fn stop(&self) {
        let mut inner = lock_inner(&self.inner);
        let was_active = inner.active.is_some();
        inner.cancel_watch();
        inner.generation += 1;
        inner.active = None;
        inner.state = PlaybackState::Idle;
        if was_active {
            self.media.pause();
        }
    }

    /// `stop` and forget the last segment
    pub fn reset(&self) {
        self.stop();
        lock_inner(&self.inner).last_segment = None;
    }
}

impl<M: MediaResource> Drop for SegmentPlaybackController<M> {
    fn drop(&mut self) {
        lock_inner(&self.inner).cancel_watch();
    }
}
