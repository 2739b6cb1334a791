// WHY: one dictation session over a loaded sentence sequence
// Navigation, grouping, attempt tracking, the confirm-before-advance flow and
// repeat playback all live here; scoring and playback stay pure / self-contained.

use std::collections::BTreeSet;
use tracing::{debug, info, warn};

use crate::config::{DictationConfig, GroupingMode};
use crate::error::{ConfigError, PlaybackError};
use crate::playback::{MediaResource, PlaybackEvent, Segment, SegmentPlaybackController};
use crate::scoring::{score, ScoreResult};
use crate::sentence_detector::normalization::normalize_text;
use crate::timing::{sentences_from_text, Sentence};

/// Identity of the context an asynchronous request was issued from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionToken {
    pub session_id: u64,
    pub sentence_index: usize,
    pub grouping_mode: GroupingMode,
}

/// Repeat bookkeeping for the sentence currently being played
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlaybackSessionState {
    pub remaining_repeats: u32,
    pub last_segment: Option<Segment>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    /// Blank submission, nothing scored and nothing changed
    Empty,
    Scored(ScoreResult),
    /// Verbatim confirmation of a solved sentence; `moved` is false on the last one
    Advanced { moved: bool },
}

/// Result of handing an asynchronous value to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Applied,
    /// Issued for a sentence or session that is no longer active; discarded
    Stale,
    /// Nothing usable in the value
    Ignored,
}

/// Platform speech recognition, supplied by the embedding application
///
/// Only finalized transcripts reach the session, through
/// [`DictationSession::append_recognition`].
pub trait SpeechRecognizer: Send {
    fn start(&mut self) -> anyhow::Result<()>;
    fn stop(&mut self);
}

/// Events the embedding application forwards from keyboard, recognizer and network callbacks
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Typed(String),
    Submit,
    PlayRequested,
    ReplayRequested,
    Next,
    Previous,
    JumpTo(usize),
    RecognitionFinal { token: SessionToken, transcript: String },
    TranslationReady { token: SessionToken, text: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    InputUpdated,
    Checked(CheckOutcome),
    Played(Result<Option<u64>, PlaybackError>),
    Navigated(bool),
    Delivered(Delivery),
}

pub struct DictationSession<M: MediaResource> {
    config: DictationConfig,
    sentences: Vec<Sentence>,
    index: usize,
    session_id: u64,
    controller: SegmentPlaybackController<M>,
    playback: PlaybackSessionState,
    completed: BTreeSet<usize>,
    draft: String,
    feedback: Option<ScoreResult>,
    awaiting_confirmation: bool,
    translation: Option<String>,
    recognizer: Option<Box<dyn SpeechRecognizer>>,
    recording: bool,
}

impl<M: MediaResource> DictationSession<M> {
    pub fn new(
        config: DictationConfig,
        controller: SegmentPlaybackController<M>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            sentences: Vec::new(),
            index: 0,
            session_id: 0,
            controller,
            playback: PlaybackSessionState::default(),
            completed: BTreeSet::new(),
            draft: String::new(),
            feedback: None,
            awaiting_confirmation: false,
            translation: None,
            recognizer: None,
            recording: false,
        })
    }

    /// Replace the sentence sequence and start a new session identity
    pub fn load(&mut self, sentences: Vec<Sentence>) {
        self.sentences = sentences;
        self.index = 0;
        self.session_id += 1;
        self.completed.clear();
        self.reset_sentence_state();
        info!(
            session_id = self.session_id,
            sentences = self.sentences.len(),
            "Loaded sentence sequence"
        );
    }

    /// Segment custom text with estimated timings and load it
    pub fn load_text(&mut self, text: &str) -> usize {
        let sentences = sentences_from_text(text);
        let count = sentences.len();
        self.load(sentences);
        count
    }

    pub fn config(&self) -> &DictationConfig {
        &self.config
    }

    pub fn controller(&self) -> &SegmentPlaybackController<M> {
        &self.controller
    }

    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    pub fn grouping_mode(&self) -> GroupingMode {
        self.config.grouping_mode
    }

    pub fn token(&self) -> SessionToken {
        SessionToken {
            session_id: self.session_id,
            sentence_index: self.index,
            grouping_mode: self.config.grouping_mode,
        }
    }

    pub fn playback_state(&self) -> PlaybackSessionState {
        self.playback
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn feedback(&self) -> Option<&ScoreResult> {
        self.feedback.as_ref()
    }

    pub fn is_awaiting_confirmation(&self) -> bool {
        self.awaiting_confirmation
    }

    pub fn translation(&self) -> Option<&str> {
        self.translation.as_deref()
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// `(attempted, total)`
    pub fn progress(&self) -> (usize, usize) {
        (self.completed.len(), self.sentences.len())
    }

    pub fn is_attempted(&self, index: usize) -> bool {
        self.completed.contains(&index)
    }

    fn paired_index(&self) -> Option<usize> {
        let next = self.index + 1;
        (self.config.grouping_mode == GroupingMode::Pair && next < self.sentences.len())
            .then_some(next)
    }

    /// The active sentence, combined with its successor in pair mode
    pub fn active_sentence(&self) -> Option<Sentence> {
        let first = self.sentences.get(self.index)?;
        Some(match self.paired_index() {
            Some(next) => Sentence::combine(first, &self.sentences[next]),
            None => first.clone(),
        })
    }

    pub fn expected_text(&self) -> Option<String> {
        self.active_sentence().map(|sentence| sentence.text)
    }

    pub fn can_go_next(&self) -> bool {
        self.index + self.config.grouping_mode.stride() < self.sentences.len()
    }

    pub fn can_go_previous(&self) -> bool {
        self.index >= self.config.grouping_mode.stride()
    }

    /// Step forward by the grouping stride; no-op past the last sentence
    pub fn next(&mut self) -> bool {
        if !self.can_go_next() {
            return false;
        }
        self.index += self.config.grouping_mode.stride();
        self.reset_sentence_state();
        true
    }

    /// Step back by the grouping stride; no-op before the first sentence
    pub fn previous(&mut self) -> bool {
        if !self.can_go_previous() {
            return false;
        }
        self.index -= self.config.grouping_mode.stride();
        self.reset_sentence_state();
        true
    }

    /// Select an arbitrary sentence, e.g. from a transcript list; clamped to the last one
    pub fn jump_to(&mut self, index: usize) -> bool {
        let Some(last) = self.sentences.len().checked_sub(1) else {
            return false;
        };
        let index = index.min(last);
        if index == self.index {
            return false;
        }
        self.index = index;
        self.reset_sentence_state();
        true
    }

    pub fn set_grouping_mode(&mut self, mode: GroupingMode) {
        if self.config.grouping_mode == mode {
            return;
        }
        self.config.grouping_mode = mode;
        self.reset_sentence_state();
    }

    pub fn set_repeat_count(&mut self, repeat_count: u32) {
        self.config.repeat_count = repeat_count.max(1);
    }

    /// Clear everything tied to the previously active sentence
    fn reset_sentence_state(&mut self) {
        self.controller.reset();
        self.playback = PlaybackSessionState::default();
        self.draft.clear();
        self.feedback = None;
        self.awaiting_confirmation = false;
        self.translation = None;
        self.stop_recording();
    }

    /// Segment for the active sentence with the trailing padding removed
    pub fn current_segment(&self) -> Option<Segment> {
        let sentence = self.active_sentence()?;
        let end = (sentence.end - self.config.segment_end_padding).max(sentence.start);
        Some(Segment::bounded(sentence.start, end))
    }

    /// Play the active sentence `repeat_count` times in total
    pub fn play_current(&mut self) -> Result<Option<u64>, PlaybackError> {
        let Some(segment) = self.current_segment() else {
            return Ok(None);
        };
        self.start_playback(segment, self.config.repeat_count.saturating_sub(1))
    }

    /// Play from the active sentence to the natural end of the media, once
    pub fn play_to_end(&mut self) -> Result<Option<u64>, PlaybackError> {
        let Some(sentence) = self.active_sentence() else {
            return Ok(None);
        };
        self.start_playback(Segment::open_ended(sentence.start), 0)
    }

    fn start_playback(
        &mut self,
        segment: Segment,
        repeats: u32,
    ) -> Result<Option<u64>, PlaybackError> {
        self.playback = PlaybackSessionState {
            remaining_repeats: repeats,
            last_segment: Some(segment),
        };
        match self.controller.play_segment(segment) {
            Ok(generation) => Ok(Some(generation)),
            Err(e) => {
                self.playback.remaining_repeats = 0;
                Err(e)
            }
        }
    }

    /// Play the last segment once more without restarting the repeat cycle
    pub fn replay_last(&mut self) -> Result<Option<u64>, PlaybackError> {
        self.playback.remaining_repeats = 0;
        self.controller.replay_last()
    }

    /// Repeat handling for controller completions; returns true when playback was re-issued
    pub fn on_playback_event(&mut self, event: PlaybackEvent) -> bool {
        let PlaybackEvent::Completed { generation, .. } = event;
        if !self.controller.is_current(generation) {
            debug!(generation, "Discarding completion of a superseded segment");
            return false;
        }

        match (self.playback.remaining_repeats, self.playback.last_segment) {
            (remaining, Some(segment)) if remaining > 0 => {
                self.playback.remaining_repeats = remaining - 1;
                debug!(remaining = remaining - 1, "Repeating segment");
                match self.controller.play_segment(segment) {
                    Ok(_) => true,
                    Err(e) => {
                        warn!(error = %e, "Repeat playback failed");
                        self.playback.remaining_repeats = 0;
                        false
                    }
                }
            }
            _ => {
                self.playback.remaining_repeats = 0;
                false
            }
        }
    }

    /// Replace the draft with sanitized text; clears feedback and confirmation
    pub fn set_input(&mut self, text: &str) {
        self.draft = normalize_text(text);
        self.feedback = None;
        self.awaiting_confirmation = false;
    }

    /// Score the current draft
    pub fn check_draft(&mut self) -> CheckOutcome {
        let draft = self.draft.clone();
        self.check(&draft)
    }

    /// Score `submitted` against the active sentence
    pub fn check(&mut self, submitted: &str) -> CheckOutcome {
        let Some(expected) = self.expected_text() else {
            return CheckOutcome::Empty;
        };
        let sanitized = normalize_text(submitted);
        let trimmed = sanitized.trim();

        if self.awaiting_confirmation && trimmed == normalize_text(&expected).trim() {
            let moved = self.next();
            if !moved {
                self.draft.clear();
                self.feedback = None;
                self.awaiting_confirmation = false;
            }
            return CheckOutcome::Advanced { moved };
        }

        if trimmed.is_empty() {
            return CheckOutcome::Empty;
        }

        let result = score(&expected, &sanitized);
        self.completed.insert(self.index);
        if let Some(next) = self.paired_index() {
            self.completed.insert(next);
        }
        debug!(
            index = self.index,
            accuracy = result.accuracy_percent,
            "Scored submission"
        );

        if result.is_correct() {
            self.awaiting_confirmation = true;
            self.draft = expected;
        } else {
            self.awaiting_confirmation = false;
            self.draft = sanitized;
        }
        self.feedback = Some(result.clone());
        CheckOutcome::Scored(result)
    }

    /// Append a finalized recognition transcript to the draft
    pub fn append_recognition(&mut self, token: SessionToken, transcript: &str) -> Delivery {
        if token != self.token() {
            debug!(?token, "Discarding stale recognition result");
            return Delivery::Stale;
        }
        let sanitized = normalize_text(transcript);
        let sanitized = sanitized.trim();
        if sanitized.is_empty() {
            return Delivery::Ignored;
        }
        let previous = self.draft.trim();
        self.draft = if previous.is_empty() {
            sanitized.to_string()
        } else {
            format!("{previous} {sanitized}")
        };
        self.feedback = None;
        self.awaiting_confirmation = false;
        Delivery::Applied
    }

    /// Attach a translation fetched for the sentence identified by `token`
    pub fn apply_translation(&mut self, token: SessionToken, text: &str) -> Delivery {
        if token != self.token() {
            debug!(?token, "Discarding stale translation");
            return Delivery::Stale;
        }
        if text.trim().is_empty() {
            return Delivery::Ignored;
        }
        self.translation = Some(text.trim().to_string());
        Delivery::Applied
    }

    /// Install the recognizer, stopping and dropping any previous one
    pub fn attach_recognizer(&mut self, recognizer: Box<dyn SpeechRecognizer>) {
        self.detach_recognizer();
        self.recognizer = Some(recognizer);
    }

    pub fn detach_recognizer(&mut self) {
        self.stop_recording();
        self.recognizer = None;
    }

    /// Start or stop recognition; returns whether it is recording afterwards
    pub fn toggle_recording(&mut self) -> anyhow::Result<bool> {
        let Some(recognizer) = self.recognizer.as_mut() else {
            anyhow::bail!("Speech recognition is not supported");
        };
        if self.recording {
            recognizer.stop();
            self.recording = false;
        } else {
            recognizer.start()?;
            self.recording = true;
        }
        Ok(self.recording)
    }

    fn stop_recording(&mut self) {
        if self.recording {
            if let Some(recognizer) = self.recognizer.as_mut() {
                recognizer.stop();
            }
            self.recording = false;
        }
    }

    /// Dispatch one event from the embedding application
    pub fn handle_event(&mut self, event: InputEvent) -> EventOutcome {
        match event {
            InputEvent::Typed(text) => {
                self.set_input(&text);
                EventOutcome::InputUpdated
            }
            InputEvent::Submit => EventOutcome::Checked(self.check_draft()),
            InputEvent::PlayRequested => EventOutcome::Played(self.play_current()),
            InputEvent::ReplayRequested => EventOutcome::Played(self.replay_last()),
            InputEvent::Next => {
                let moved = self.next();
                self.play_after_navigation(moved);
                EventOutcome::Navigated(moved)
            }
            InputEvent::Previous => {
                let moved = self.previous();
                self.play_after_navigation(moved);
                EventOutcome::Navigated(moved)
            }
            InputEvent::JumpTo(index) => {
                let moved = self.jump_to(index);
                self.play_after_navigation(moved);
                EventOutcome::Navigated(moved)
            }
            InputEvent::RecognitionFinal { token, transcript } => {
                EventOutcome::Delivered(self.append_recognition(token, &transcript))
            }
            InputEvent::TranslationReady { token, text } => {
                EventOutcome::Delivered(self.apply_translation(token, &text))
            }
        }
    }

    fn play_after_navigation(&mut self, moved: bool) {
        if !moved {
            return;
        }
        if let Err(e) = self.play_current() {
            warn!(error = %e, index = self.index, "Could not play sentence after navigation");
        }
    }
}

impl<M: MediaResource> Drop for DictationSession<M> {
    fn drop(&mut self) {
        self.stop_recording();
    }
}
