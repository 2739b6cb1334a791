use thiserror::Error;

/// Failures reported by a media capability
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    #[error("media is not ready to play")]
    NotReady,
    #[error("media rejected playback: {0}")]
    Rejected(String),
}

/// Caller-visible failures of the segment playback controller
///
/// Both leave the controller idle; re-issuing the request is always safe.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    #[error("playback requested before the media signalled readiness")]
    NotReady,
    #[error("playback failed to start: {0}")]
    StartFailed(String),
}

impl From<MediaError> for PlaybackError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::NotReady => PlaybackError::NotReady,
            MediaError::Rejected(reason) => PlaybackError::StartFailed(reason),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("grouping mode must be 1 or 2, got {0}")]
    InvalidGroupingMode(u8),
    #[error("repeat count must be at least 1")]
    InvalidRepeatCount,
    #[error("segment end padding must be a finite, non-negative number of seconds, got {0}")]
    InvalidPadding(f64),
    #[error("boundary poll interval must be greater than zero")]
    InvalidPollInterval,
}

/// The sentence boundary pattern built from the segmenter rules did not compile
#[derive(Debug, Error)]
#[error("sentence boundary pattern failed to compile: {0}")]
pub struct SegmenterError(#[from] regex_automata::meta::BuildError);

/// Failure of a single dictionary provider
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
    #[error("word not found")]
    NotFound,
    #[error("unexpected response shape: {0}")]
    Malformed(String),
    #[error("transport failure: {0}")]
    Transport(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PronunciationError {
    #[error("nothing to look up after normalizing {0:?}")]
    InvalidWord(String),
    #[error("all pronunciation providers failed, last error: {0}")]
    AllProvidersFailed(ProviderError),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error while {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error while {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub(crate) fn json(context: &'static str, source: serde_json::Error) -> Self {
        Self::Json { context, source }
    }
}
