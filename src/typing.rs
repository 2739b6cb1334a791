// WHY: typing drill compares character by character as the learner types the sentence

use serde::{Deserialize, Serialize};

use crate::sentence_detector::normalization::{collapse_whitespace, normalize_text};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharStatus {
    Correct,
    Incorrect,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedChar {
    pub expected: char,
    pub status: CharStatus,
}

/// Character-level view of a typing attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypingProgress {
    pub chars: Vec<TypedChar>,
    /// Number of typed characters, used to place the caret
    pub caret: usize,
    complete: bool,
}

impl TypingProgress {
    /// Compare `typed` against `target` after typographic normalization
    pub fn evaluate(target: &str, typed: &str) -> Self {
        let target_text = normalize_text(target);
        let typed_text = normalize_text(typed);
        let typed_chars: Vec<char> = typed_text.chars().collect();

        let chars = target_text
            .chars()
            .enumerate()
            .map(|(i, expected)| {
                let status = match typed_chars.get(i) {
                    None => CharStatus::Pending,
                    Some(c) if *c == expected => CharStatus::Correct,
                    Some(_) => CharStatus::Incorrect,
                };
                TypedChar { expected, status }
            })
            .collect();

        let normalized_target = collapse_whitespace(&target_text);
        let complete = !normalized_target.is_empty()
            && collapse_whitespace(&typed_text) == normalized_target;

        Self {
            chars,
            caret: typed_chars.len(),
            complete,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn mistakes(&self) -> usize {
        self.chars
            .iter()
            .filter(|c| c.status == CharStatus::Incorrect)
            .count()
    }
}

/// `"i / n"` with the 1-based index clamped to the total
pub fn progress_label(index: usize, total: usize) -> String {
    format!("{} / {}", (index + 1).min(total), total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_typing() {
        let progress = TypingProgress::evaluate("Hello", "Hex");
        let statuses: Vec<CharStatus> = progress.chars.iter().map(|c| c.status).collect();
        assert_eq!(
            statuses,
            vec![
                CharStatus::Correct,
                CharStatus::Correct,
                CharStatus::Incorrect,
                CharStatus::Pending,
                CharStatus::Pending
            ]
        );
        assert_eq!(progress.caret, 3);
        assert_eq!(progress.mistakes(), 1);
        assert!(!progress.is_complete());
    }

    #[test]
    fn test_completion_ignores_typography_and_spacing() {
        let progress = TypingProgress::evaluate("It\u{2019}s  done.\n", "It's done.");
        assert!(progress.is_complete());
    }

    #[test]
    fn test_empty_target_never_complete() {
        assert!(!TypingProgress::evaluate("", "").is_complete());
    }

    #[test]
    fn test_progress_label() {
        assert_eq!(progress_label(0, 4), "1 / 4");
        assert_eq!(progress_label(9, 4), "4 / 4");
    }
}
