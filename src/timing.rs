// WHY: sentences carry the media interval they were spoken in
// Estimated timings for custom text, actual timings for extracted transcripts

use serde::{Deserialize, Serialize};

use crate::sentence_detector;

/// Average speaking rate used when no real timing is known (150 words/minute)
pub const WORDS_PER_SECOND: f64 = 2.5;
/// Pause allowance per word
pub const PAUSE_PER_WORD: f64 = 0.2;
/// Upper bound on the pause allowance of one sentence
pub const MAX_PAUSE: f64 = 2.0;
/// Length assumed for a transcript entry carrying neither end nor duration
pub const DEFAULT_ENTRY_DURATION: f64 = 3.0;

/// One dictation unit: text plus its `[start, end)` interval in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

impl Sentence {
    /// Build a sentence, clamping `start` to `>= 0` and `end` to `>= start`
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        let start = if start.is_finite() { start.max(0.0) } else { 0.0 };
        let end = if end.is_finite() { end.max(start) } else { start };
        Self {
            text: text.into(),
            start,
            end,
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Pseudo-sentence spanning two adjacent sentences (grouping mode 2)
    pub fn combine(first: &Sentence, second: &Sentence) -> Sentence {
        Sentence::new(
            format!("{} {}", first.text, second.text),
            first.start,
            second.end,
        )
    }

    /// Start time formatted for display
    pub fn timestamp(&self) -> String {
        format_timestamp(self.start)
    }
}

/// Transcript record as delivered by an external caption source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub text: String,
    #[serde(default)]
    pub start: f64,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub end: Option<f64>,
}

/// Estimated speaking time of a sentence in seconds
pub fn estimate_duration(text: &str) -> f64 {
    let word_count = text.split_whitespace().count() as f64;
    if word_count == 0.0 {
        return 0.0;
    }
    word_count / WORDS_PER_SECOND + (word_count * PAUSE_PER_WORD).min(MAX_PAUSE)
}

/// Segment `text` and lay the sentences end to end from zero with estimated durations
pub fn sentences_from_text(text: &str) -> Vec<Sentence> {
    let mut current = 0.0;
    sentence_detector::segment(text)
        .into_iter()
        .map(|sentence_text| {
            let start = current;
            let end = start + estimate_duration(&sentence_text);
            current = end;
            Sentence::new(sentence_text, start, end)
        })
        .collect()
}

/// Convert extracted transcript entries into sentences with actual timings
///
/// Text is normalized and blank entries are dropped. Each end comes from `end`, else `start + duration`,
/// else `start + 3s`, and is clamped to the next sentence's start when that start is later.
pub fn sentences_from_transcript(entries: &[TranscriptEntry]) -> Vec<Sentence> {
    let mut sentences: Vec<Sentence> = entries
        .iter()
        .filter_map(|entry| {
            let text = sentence_detector::collapse_whitespace(&sentence_detector::normalize_text(&entry.text));
            if text.is_empty() {
                return None;
            }
            let start = if entry.start.is_finite() { entry.start.max(0.0) } else { 0.0 };
            let end = entry
                .end
                .filter(|end| end.is_finite() && *end > 0.0)
                .or_else(|| {
                    entry
                        .duration
                        .filter(|d| d.is_finite() && *d > 0.0)
                        .map(|d| start + d)
                })
                .unwrap_or(start + DEFAULT_ENTRY_DURATION);
            Some(Sentence::new(text, start, end))
        })
        .collect();

    for i in 0..sentences.len().saturating_sub(1) {
        let next_start = sentences[i + 1].start;
        let current = &mut sentences[i];
        if next_start > current.start && current.end > next_start {
            current.end = next_start;
        }
    }

    sentences
}

/// `MM:SS` under one hour, `HH:MM:SS` otherwise
pub fn format_timestamp(seconds: f64) -> String {
    let total = if seconds.is_finite() { seconds.max(0.0) as u64 } else { 0 };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes:02}:{secs:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(text: &str, start: f64, duration: Option<f64>, end: Option<f64>) -> TranscriptEntry {
        TranscriptEntry {
            text: text.to_string(),
            start,
            duration,
            end,
        }
    }

    #[test]
    fn test_sentence_new_clamps() {
        let s = Sentence::new("x", -2.0, -5.0);
        assert_eq!(s.start, 0.0);
        assert_eq!(s.end, 0.0);
        let s = Sentence::new("x", 4.0, 3.0);
        assert_eq!(s.end, 4.0);
    }

    #[test]
    fn test_estimate_duration() {
        assert_eq!(estimate_duration(""), 0.0);
        // 5 words: 2.0s speaking + 1.0s pause
        assert!((estimate_duration("one two three four five") - 3.0).abs() < 1e-9);
        // 20 words: pause capped at 2s
        let long = vec!["w"; 20].join(" ");
        assert!((estimate_duration(&long) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_sentences_from_text_contiguous() {
        let sentences = sentences_from_text("One two. Three four five. Six.");
        assert_eq!(sentences.len(), 3);
        assert_eq!(sentences[0].start, 0.0);
        for pair in sentences.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
            assert!(pair[1].start > pair[0].start);
        }
    }

    #[test]
    fn test_transcript_end_fallbacks_and_clamp() {
        let entries = vec![
            entry("first", 1.0, Some(5.0), None),
            entry("   ", 2.0, Some(1.0), None),
            entry("second", 4.0, None, Some(6.5)),
            entry("third", 8.0, None, None),
        ];
        let sentences = sentences_from_transcript(&entries);
        assert_eq!(sentences.len(), 3);
        assert_eq!(sentences[0].end, 4.0); // clamped to next start
        assert_eq!(sentences[1].end, 6.5);
        assert_eq!(sentences[2].end, 11.0);
    }

    #[test]
    fn test_combine() {
        let a = Sentence::new("Hello there.", 1.0, 2.0);
        let b = Sentence::new("General Kenobi.", 2.0, 4.0);
        let c = Sentence::combine(&a, &b);
        assert_eq!(c.text, "Hello there. General Kenobi.");
        assert_eq!((c.start, c.end), (1.0, 4.0));
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0), "00:00");
        assert_eq!(format_timestamp(75.9), "01:15");
        assert_eq!(format_timestamp(3725.0), "01:02:05");
    }
}
