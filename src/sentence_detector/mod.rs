// WHY: splits a practice text into the ordered sentences a learner dictates one at a time
// Line breaks always separate sentences; within a line, terminal punctuation does unless absorbed

use regex_automata::meta::Regex;
use std::sync::OnceLock;
use tracing::{debug, warn};

pub mod abbreviations;
pub mod normalization;

pub use abbreviations::AbbreviationChecker;
pub use normalization::{collapse_whitespace, normalize_text, normalize_word};

use crate::error::SegmenterError;

/// Configuration for sentence boundary detection rules
#[derive(Debug, Clone)]
pub struct SentenceBoundaryRules {
    /// End punctuation characters that can terminate a sentence
    pub end_punctuation: Vec<char>,
    /// Closing quotes and brackets that stay attached to the sentence they close
    pub closing_marks: Vec<char>,
}

impl Default for SentenceBoundaryRules {
    fn default() -> Self {
        Self {
            end_punctuation: vec!['.', '?', '!'],
            closing_marks: vec!['"', '\'', ')', ']', '}'],
        }
    }
}

impl SentenceBoundaryRules {
    /// Candidate pattern: text up to a terminal run plus its closing marks, or a trailing fragment
    fn candidate_pattern(&self) -> String {
        let end = class_body(&self.end_punctuation);
        let close = class_body(&self.closing_marks);
        let closing = if close.is_empty() { String::new() } else { format!("[{close}]*") };
        format!(r"[^{end}\n]*[{end}]+{closing}|[^{end}\n]+$")
    }
}

// WHY: rules are plain chars, so every regex meta character must be escaped inside a class
fn class_body(chars: &[char]) -> String {
    let mut body = String::new();
    for &ch in chars {
        if r"\.+*?()|[]{}^$#&-~".contains(ch) {
            body.push('\\');
        }
        body.push(ch);
    }
    body
}

/// Abbreviation-aware sentence segmenter
///
/// Boundary candidates come from one compiled pattern; each candidate is then
/// checked against inner-period and abbreviation rules before it splits.
/// Restartable: holds only immutable state, so one instance can be shared freely.
#[derive(Debug, Clone)]
pub struct SentenceSegmenter {
    candidates: Regex,
    abbreviations: AbbreviationChecker,
}

impl SentenceSegmenter {
    /// Create new segmenter with custom rules
    pub fn new(rules: SentenceBoundaryRules) -> Result<Self, SegmenterError> {
        let pattern = rules.candidate_pattern();
        debug!("Compiling sentence boundary pattern {}", pattern);
        Ok(Self {
            candidates: Regex::new(&pattern)?,
            abbreviations: AbbreviationChecker::new(),
        })
    }

    /// Create segmenter with default rules
    pub fn with_default_rules() -> Result<Self, SegmenterError> {
        Self::new(SentenceBoundaryRules::default())
    }

    /// Split `text` into trimmed, non-empty sentences in document order
    ///
    /// Text is typographically normalized first, so the returned sentences only
    /// contain characters of the normalized input. Blank input yields an empty vector.
    pub fn segment(&self, text: &str) -> Vec<String> {
        let Some(cleaned) = prepare(text) else {
            return Vec::new();
        };

        let mut sentences = Vec::new();
        for line in cleaned.split('\n') {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            self.segment_line(line, &mut sentences);
        }

        // Never drop content silently
        if sentences.is_empty() {
            sentences.push(collapse_whitespace(&cleaned));
        }

        debug!("Segmented {} chars into {} sentences", cleaned.len(), sentences.len());
        sentences
    }

    fn segment_line(&self, line: &str, sentences: &mut Vec<String>) {
        let mut sentence_start = 0usize;

        for candidate in self.candidates.find_iter(line) {
            let cut = candidate.end();
            let following = &line[cut..];

            if !following.is_empty() {
                // "3.14", "e.g." and "example.com" keep their inner periods
                if !following.starts_with(char::is_whitespace) {
                    continue;
                }
                let preceding = &line[sentence_start..cut];
                if self.abbreviations.suppresses_boundary(preceding, following) {
                    continue;
                }
            }

            push_sentence(&line[sentence_start..cut], sentences);
            sentence_start = cut;
        }

        if sentence_start < line.len() {
            push_sentence(&line[sentence_start..], sentences);
        }
    }
}

/// Normalized, newline-unified, trimmed text; `None` when nothing is left
fn prepare(text: &str) -> Option<String> {
    let normalized = normalize_text(text).replace("\r\n", "\n").replace('\r', "\n");
    let cleaned = normalized.trim();
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}

fn push_sentence(raw: &str, sentences: &mut Vec<String>) {
    let sentence = collapse_whitespace(raw);
    if !sentence.is_empty() {
        sentences.push(sentence);
    }
}

static DEFAULT_SEGMENTER: OnceLock<Result<SentenceSegmenter, SegmenterError>> = OnceLock::new();

/// Segment with the default rules
///
/// If the default pattern cannot be built, each non-blank line becomes one sentence.
pub fn segment(text: &str) -> Vec<String> {
    match DEFAULT_SEGMENTER.get_or_init(SentenceSegmenter::with_default_rules) {
        Ok(segmenter) => segmenter.segment(text),
        Err(e) => {
            warn!(error = %e, "Default sentence segmenter unavailable, splitting on lines only");
            prepare(text)
                .map(|cleaned| {
                    cleaned
                        .split('\n')
                        .map(collapse_whitespace)
                        .filter(|line| !line.is_empty())
                        .collect()
                })
                .unwrap_or_default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_sentences() {
        let sentences = segment("Hello world. This is a test. How are you?");
        assert_eq!(sentences, vec!["Hello world.", "This is a test.", "How are you?"]);
    }

    #[test]
    fn test_trailing_fragment_kept() {
        let sentences = segment("First one! and then some words");
        assert_eq!(sentences, vec!["First one!", "and then some words"]);
    }

    #[test]
    fn test_line_breaks_split() {
        let sentences = segment("Title line\r\nBody sentence one. Body two.\n\n\nLast");
        assert_eq!(
            sentences,
            vec!["Title line", "Body sentence one.", "Body two.", "Last"]
        );
    }

    #[test]
    fn test_abbreviations_do_not_split() {
        let sentences = segment("Mr. Smith met Dr. Jones at the U.S. embassy. They talked.");
        assert_eq!(
            sentences,
            vec!["Mr. Smith met Dr. Jones at the U.S. embassy.", "They talked."]
        );
    }

    #[test]
    fn test_time_abbreviation_before_capital_splits() {
        let sentences = segment("I wake up at 7 a.m. Then I eat breakfast.");
        assert_eq!(sentences, vec!["I wake up at 7 a.m.", "Then I eat breakfast."]);
    }

    #[test]
    fn test_inner_periods_and_closing_quotes() {
        let sentences = segment("Pi is 3.14 roughly. He said \"Stop.\" Then he left.");
        assert_eq!(
            sentences,
            vec!["Pi is 3.14 roughly.", "He said \"Stop.\"", "Then he left."]
        );
    }

    #[test]
    fn test_punctuation_only_input_kept() {
        assert_eq!(segment("..."), vec!["..."]);
        assert_eq!(segment("?! ..."), vec!["?!", "..."]);
    }

    #[test]
    fn test_empty_and_blank() {
        assert!(segment("").is_empty());
        assert!(segment("  \n\t ").is_empty());
    }

    #[test]
    fn test_custom_rules_escape_pattern_characters() {
        let rules = SentenceBoundaryRules {
            end_punctuation: vec!['.', ';'],
            closing_marks: vec![']', '-'],
        };
        let segmenter = SentenceSegmenter::new(rules).expect("pattern should compile");
        assert_eq!(
            segmenter.segment("One; two.] Three? four"),
            vec!["One;", "two.]", "Three? four"]
        );
    }

    #[test]
    fn test_typography_normalized() {
        let sentences = segment("She said \u{201C}hi\u{201D}\u{2026} It\u{2019}s late.");
        assert_eq!(sentences, vec!["She said \"hi\"...", "It's late."]);
    }
}
