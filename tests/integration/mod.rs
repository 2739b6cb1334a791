// Integration test utilities and common code
// WHY: Centralized utilities avoid duplication across integration tests
#![allow(dead_code)]

pub mod fixtures;

use dictate::config::DictationConfig;
use dictate::playback::{PlaybackEvent, SegmentPlaybackController, SimulatedMedia};
use dictate::session::DictationSession;
use dictate::timing::TranscriptEntry;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::mpsc::UnboundedReceiver;

/// Test fixture helper for creating temporary practice texts, transcripts and stores
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub root_path: PathBuf,
}

impl TestFixture {
    /// Create a new test fixture with temporary directory
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root_path = temp_dir.path().to_path_buf();

        Self {
            temp_dir,
            root_path,
        }
    }

    /// Create a plain practice text file with given content
    pub fn create_text_file<P: AsRef<Path>>(&self, relative_path: P, content: &str) -> PathBuf {
        let file_path = self.root_path.join(relative_path);

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }

        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    /// Write transcript entries as the JSON array the CLI reads
    pub fn create_transcript_file<P: AsRef<Path>>(
        &self,
        relative_path: P,
        entries: &[TranscriptEntry],
    ) -> PathBuf {
        let content = serde_json::to_string_pretty(entries).expect("Failed to serialize transcript");
        self.create_text_file(relative_path, &content)
    }

    /// Saved-text store location for the fixture root
    pub fn store_path(&self) -> PathBuf {
        self.root_path.join(".dictate_texts.json")
    }
}

/// Session over fresh simulated media of `media_length` seconds
pub fn new_session(
    config: DictationConfig,
    media_length: Option<f64>,
) -> (DictationSession<SimulatedMedia>, UnboundedReceiver<PlaybackEvent>) {
    let media = Arc::new(SimulatedMedia::new(media_length));
    let (controller, events) = SegmentPlaybackController::new(media, config.poll_interval());
    let session = DictationSession::new(config, controller).expect("valid config");
    (session, events)
}

/// Compare two strings line by line, providing detailed diff on mismatch
pub fn assert_golden_file(actual: &str, expected: &str, context: &str) {
    let actual_lines: Vec<&str> = actual.lines().collect();
    let expected_lines: Vec<&str> = expected.lines().collect();

    if actual_lines.len() != expected_lines.len() {
        panic!(
            "{}: Line count mismatch. Expected {} lines, got {} lines\nActual:\n{}",
            context,
            expected_lines.len(),
            actual_lines.len(),
            actual
        );
    }

    for (i, (actual_line, expected_line)) in actual_lines.iter().zip(expected_lines.iter()).enumerate() {
        if actual_line != expected_line {
            panic!(
                "{}: Line {} mismatch\nExpected: {}\nActual:   {}",
                context,
                i + 1,
                expected_line,
                actual_line
            );
        }
    }
}
