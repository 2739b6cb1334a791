pub mod config;
pub mod error;
pub mod playback;
pub mod pronunciation;
pub mod scoring;
pub mod sentence_detector;
pub mod session;
pub mod store;
pub mod timing;
pub mod typing;

// Re-export main types for convenient access
pub use config::{DictationConfig, GroupingMode};
pub use error::{
    ConfigError, MediaError, PlaybackError, PronunciationError, ProviderError, SegmenterError, StoreError,
};
pub use playback::{
    MediaResource, PlaybackEvent, PlaybackState, Segment, SegmentPlaybackController, SimulatedMedia,
};
pub use scoring::{score, ScoreResult, ScoreType, WordStatus};
pub use sentence_detector::{segment, SentenceSegmenter};
pub use session::{CheckOutcome, Delivery, DictationSession, InputEvent, SessionToken};
pub use timing::{sentences_from_text, sentences_from_transcript, Sentence, TranscriptEntry};
