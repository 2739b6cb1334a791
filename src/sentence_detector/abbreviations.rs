// WHY: a period inside a known abbreviation must not end a dictation sentence
// Title abbreviations never split; other abbreviations split only before a capitalized word

use std::collections::HashSet;

/// Title abbreviations that precede a name and never close a sentence ("Dr. Smith")
pub const TITLE_ABBREVIATIONS: &[&str] = &[
    "Mr.", "Mrs.", "Ms.", "Dr.", "Prof.", "Sr.", "Jr.", "St.",
];

/// All abbreviations whose trailing period is not a sentence terminator by itself
pub const ABBREVIATIONS: &[&str] = &[
    "Mr.", "Mrs.", "Ms.", "Dr.", "Prof.", "Sr.", "Jr.", "St.",
    "vs.", "e.g.", "i.e.", "etc.", "a.m.", "p.m.", "A.M.", "P.M.",
    "U.S.", "U.K.", "U.S.A.", "D.C.", "approx.", "No.",
];

/// Leading characters stripped from a word before abbreviation lookup
const OPENING_MARKS: &[char] = &['"', '\'', '(', '[', '{'];

/// Efficient abbreviation lookup using HashSet for O(1) performance
#[derive(Debug, Clone)]
pub struct AbbreviationChecker {
    abbreviations: HashSet<&'static str>,
    title_abbreviations: HashSet<&'static str>,
}

impl AbbreviationChecker {
    /// Create new abbreviation checker with default abbreviation sets
    pub fn new() -> Self {
        Self {
            abbreviations: ABBREVIATIONS.iter().copied().collect(),
            title_abbreviations: TITLE_ABBREVIATIONS.iter().copied().collect(),
        }
    }

    /// Check if a word is a known abbreviation
    pub fn is_abbreviation(&self, word: &str) -> bool {
        self.abbreviations.contains(word)
    }

    /// Check if a word is a title abbreviation
    pub fn is_title_abbreviation(&self, word: &str) -> bool {
        self.title_abbreviations.contains(word)
    }

    /// Last whitespace-delimited word of `text` with opening quotes/brackets removed
    fn last_word(text: &str) -> Option<&str> {
        text.split_whitespace()
            .last()
            .map(|word| word.trim_start_matches(OPENING_MARKS))
    }

    /// Check if text ends with any known abbreviation
    pub fn ends_with_abbreviation(&self, text: &str) -> bool {
        Self::last_word(text).is_some_and(|word| self.is_abbreviation(word))
    }

    /// Check if text ends with a title abbreviation
    pub fn ends_with_title_abbreviation(&self, text: &str) -> bool {
        Self::last_word(text).is_some_and(|word| self.is_title_abbreviation(word))
    }

    /// Decide whether a terminal punctuation run at the end of `preceding` is absorbed by an
    /// abbreviation, given the text that follows it on the same line
    pub fn suppresses_boundary(&self, preceding: &str, following: &str) -> bool {
        if self.ends_with_title_abbreviation(preceding) {
            return true;
        }
        if !self.ends_with_abbreviation(preceding) {
            return false;
        }
        // "at 7 a.m. Then we ate" still splits; "e.g. apples" does not
        let next_starts_upper = following
            .trim_start()
            .trim_start_matches(OPENING_MARKS)
            .chars()
            .next()
            .is_some_and(char::is_uppercase);
        !next_starts_upper
    }
}

impl Default for AbbreviationChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;

    static SHARED_CHECKER: OnceLock<AbbreviationChecker> = OnceLock::new();

    fn get_checker() -> &'static AbbreviationChecker {
        SHARED_CHECKER.get_or_init(AbbreviationChecker::new)
    }

    #[test]
    fn test_abbreviation_classification() {
        let checker = get_checker();

        for abbr in ["Dr.", "U.S.", "p.m.", "e.g.", "etc."] {
            assert!(checker.is_abbreviation(abbr), "Should detect {abbr} as abbreviation");
        }
        assert!(!checker.is_abbreviation("Hello"));

        for abbr in ["Dr.", "Prof.", "Mr.", "Mrs."] {
            assert!(checker.is_title_abbreviation(abbr), "Should detect {abbr} as title");
        }
        assert!(!checker.is_title_abbreviation("U.S."));
        assert!(!checker.is_title_abbreviation("p.m."));
    }

    #[test]
    fn test_ends_with_abbreviation() {
        let checker = get_checker();
        let cases = [
            ("Meeting at 5 p.m.", true),
            ("He lives in the U.S.", true),
            ("This is a sentence.", false),
            ("Call (Dr.", true),
            ("", false),
        ];
        for (text, expected) in cases {
            assert_eq!(checker.ends_with_abbreviation(text), expected, "failed for: {text}");
        }
    }

    #[test]
    fn test_suppresses_boundary() {
        let checker = get_checker();
        assert!(checker.suppresses_boundary("Hello Mr.", " Smith went home."));
        assert!(checker.suppresses_boundary("Fruit, e.g.", " apples."));
        assert!(!checker.suppresses_boundary("I wake up at 7 a.m.", " Then I eat."));
        assert!(!checker.suppresses_boundary("The end.", " Next one."));
    }
}
