// WHY: word-level feedback on what the learner heard versus what was said
//
// Comparison is positional, not edit-distance: word i of the submission is
// compared with word i of the expected sentence. One early omission therefore
// shifts every later word and marks them Incorrect. That is the intended
// word-for-word recall behavior for dictation practice.

use serde::{Deserialize, Serialize};

use crate::sentence_detector::normalization::{normalize_text, normalize_word};

/// Placeholder character used by [`mask_word`]
pub const MASK_CHAR: char = '*';

/// Per-word classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordStatus {
    Correct,
    Incorrect,
    Missing,
}

/// Overall classification of a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreType {
    Correct,
    Partial,
    Incorrect,
}

/// One entry per expected-word position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdownEntry {
    pub expected: String,
    pub masked_expected: String,
    pub user: Option<String>,
    pub status: WordStatus,
}

/// Submitted word beyond the expected sentence length
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraWord {
    pub word: String,
    pub masked: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    #[serde(rename = "type")]
    pub score_type: ScoreType,
    pub accuracy_percent: u32,
    pub breakdown: Vec<ScoreBreakdownEntry>,
    pub extra_words: Vec<ExtraWord>,
}

impl ScoreResult {
    /// Learner-facing summary line
    pub fn message(&self) -> &'static str {
        match self.score_type {
            ScoreType::Correct => "You are correct",
            ScoreType::Partial => "Some words are correct, please continue editing.",
            ScoreType::Incorrect => "Incorrect, please review the words in red.",
        }
    }

    pub fn is_correct(&self) -> bool {
        self.score_type == ScoreType::Correct
    }

    pub fn correct_count(&self) -> usize {
        self.breakdown
            .iter()
            .filter(|entry| entry.status == WordStatus::Correct)
            .count()
    }
}

/// One placeholder per character, at least one
pub fn mask_word(word: &str) -> String {
    let len = word.chars().count().max(1);
    std::iter::repeat(MASK_CHAR).take(len).collect()
}

/// Score `submitted` against `expected`
///
/// Pure and total. Accuracy is `round(correct / expected_words * 100)`, or 0 when
/// the expected sentence has no words. Extra trailing words are reported
/// separately and never enter the denominator; they do block a `Correct` verdict.
pub fn score(expected: &str, submitted: &str) -> ScoreResult {
    let expected_text = normalize_text(expected);
    let submitted_text = normalize_text(submitted);
    let expected_words: Vec<&str> = expected_text.split_whitespace().collect();
    let submitted_words: Vec<&str> = submitted_text.split_whitespace().collect();

    let breakdown: Vec<ScoreBreakdownEntry> = expected_words
        .iter()
        .enumerate()
        .map(|(i, expected_word)| {
            let user_word = submitted_words.get(i).copied();
            let status = match user_word {
                None => WordStatus::Missing,
                Some(word) if normalize_word(expected_word) == normalize_word(word) => {
                    WordStatus::Correct
                }
                Some(_) => WordStatus::Incorrect,
            };
            ScoreBreakdownEntry {
                expected: (*expected_word).to_string(),
                masked_expected: mask_word(expected_word),
                user: user_word.map(str::to_string),
                status,
            }
        })
        .collect();

    let extra_words: Vec<ExtraWord> = submitted_words
        .iter()
        .skip(expected_words.len())
        .map(|word| ExtraWord {
            word: (*word).to_string(),
            masked: mask_word(word),
        })
        .collect();

    let correct_count = breakdown
        .iter()
        .filter(|entry| entry.status == WordStatus::Correct)
        .count();
    let accuracy_percent = if expected_words.is_empty() {
        0
    } else {
        (correct_count as f64 / expected_words.len() as f64 * 100.0).round() as u32
    };

    let all_correct = breakdown.iter().all(|entry| entry.status == WordStatus::Correct);
    let score_type = if accuracy_percent == 100 && extra_words.is_empty() && all_correct {
        ScoreType::Correct
    } else if correct_count > 0 {
        ScoreType::Partial
    } else {
        ScoreType::Incorrect
    };

    ScoreResult {
        score_type,
        accuracy_percent,
        breakdown,
        extra_words,
    }
}
