// WHY: typographic variants must compare equal before any word is scored
// One ordered substitution table shared by the scorer, segmenter and live input sanitizing

/// Ordered categorical substitutions applied by [`normalize_text`]
/// Each entry maps a set of characters onto one ASCII replacement (possibly empty)
const SUBSTITUTIONS: &[(&[char], &str)] = &[
    // curly and angled single quotes, primes
    (&['\u{2018}', '\u{2019}', '\u{201A}', '\u{201B}', '\u{2032}', '\u{2035}'], "'"),
    // curly and angled double quotes, double primes
    (&['\u{201C}', '\u{201D}', '\u{201E}', '\u{201F}', '\u{2033}', '\u{2036}'], "\""),
    // hyphen, non-breaking hyphen, figure dash, en dash, em dash, horizontal bar, minus
    (&['\u{2010}', '\u{2011}', '\u{2012}', '\u{2013}', '\u{2014}', '\u{2015}', '\u{2212}'], "-"),
    (&['\u{2026}'], "..."),
    // bullets and middle dots
    (&['\u{2022}', '\u{2023}', '\u{2043}', '\u{2219}', '\u{00B7}'], "-"),
    (&['\u{2044}'], "/"),
    (&['\u{02C6}'], "^"),
    (&['\u{02DC}'], "~"),
    (&['\u{00B0}'], "deg"),
    (&['\u{00A9}'], "(c)"),
    (&['\u{00AE}'], "(r)"),
    (&['\u{2122}'], "TM"),
    // no-break, en/em/thin/hair spaces, zero width space, narrow no-break, math space, ideographic
    (
        &[
            '\u{00A0}', '\u{2000}', '\u{2001}', '\u{2002}', '\u{2003}', '\u{2004}', '\u{2005}',
            '\u{2006}', '\u{2007}', '\u{2008}', '\u{2009}', '\u{200A}', '\u{200B}', '\u{202F}',
            '\u{205F}', '\u{3000}',
        ],
        " ",
    ),
    // zero width non-joiner, zero width joiner, byte order mark
    (&['\u{200C}', '\u{200D}', '\u{FEFF}'], ""),
    // caption filler marker
    (&['\u{266A}'], ""),
];

/// Punctuation removed by [`normalize_word`] before equality testing
pub const WORD_PUNCTUATION: &[char] = &[
    '-', '.', ',', '!', '?', ';', ':', '\'', '"', '(', ')', '[', ']', '{', '}',
];

fn substitution_for(ch: char) -> Option<&'static str> {
    SUBSTITUTIONS
        .iter()
        .find(|(chars, _)| chars.contains(&ch))
        .map(|(_, replacement)| *replacement)
}

/// Fold typographic Unicode variants onto their ASCII equivalents
///
/// Pure and total: every input, including the empty string, has an output.
/// No replacement produces a character that another entry would rewrite, so
/// `normalize_text(normalize_text(s)) == normalize_text(s)`.
pub fn normalize_text(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    normalize_text_into(text, &mut result);
    result
}

/// Normalize into a supplied buffer so live input can be sanitized without reallocating
pub fn normalize_text_into(text: &str, buffer: &mut String) {
    buffer.clear();
    buffer.reserve(text.len());

    for ch in text.chars() {
        match substitution_for(ch) {
            Some(replacement) => buffer.push_str(replacement),
            None => buffer.push(ch),
        }
    }
}

/// Canonical form of a single word for equality testing only, never for display
pub fn normalize_word(word: &str) -> String {
    normalize_text(word)
        .to_lowercase()
        .chars()
        .filter(|c| !WORD_PUNCTUATION.contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Collapse every whitespace run (including `\r\n`) into one space and trim the ends
pub fn collapse_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    collapse_whitespace_into(text, &mut result);
    result
}

/// Whitespace collapsing into a supplied buffer
pub fn collapse_whitespace_into(text: &str, buffer: &mut String) {
    buffer.clear();
    buffer.reserve(text.len());

    let mut prev_was_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !prev_was_space {
                buffer.push(' ');
                prev_was_space = true;
            }
        } else {
            buffer.push(ch);
            prev_was_space = false;
        }
    }

    let trimmed = buffer.trim();
    if trimmed.len() != buffer.len() {
        let trimmed_content = trimmed.to_string();
        buffer.clear();
        buffer.push_str(&trimmed_content);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quotes_fold_to_ascii() {
        assert_eq!(normalize_text("\u{2018}hi\u{2019}"), "'hi'");
        assert_eq!(normalize_text("\u{201C}hi\u{201D}"), "\"hi\"");
        assert_eq!(normalize_text("Don\u{2019}t"), "Don't");
    }

    #[test]
    fn test_dashes_and_symbols() {
        assert_eq!(normalize_text("a\u{2014}b\u{2013}c\u{2212}d"), "a-b-c-d");
        assert_eq!(normalize_text("wait\u{2026}"), "wait...");
        assert_eq!(normalize_text("\u{2022} item"), "- item");
        assert_eq!(normalize_text("1\u{2044}2"), "1/2");
        assert_eq!(normalize_text("x\u{02C6}y\u{02DC}"), "x^y~");
        assert_eq!(normalize_text("30\u{00B0}"), "30deg");
        assert_eq!(normalize_text("\u{00A9}\u{00AE}\u{2122}"), "(c)(r)TM");
    }

    #[test]
    fn test_spaces_and_invisibles() {
        assert_eq!(normalize_text("a\u{00A0}b\u{202F}c\u{3000}d"), "a b c d");
        assert_eq!(normalize_text("zero\u{200D}width\u{FEFF}"), "zerowidth");
        assert_eq!(normalize_text("\u{266A} la la \u{266A}"), " la la ");
    }

    #[test]
    fn test_normalize_text_empty() {
        assert_eq!(normalize_text(""), "");
    }

    #[test]
    fn test_normalize_text_idempotent() {
        let samples = [
            "\u{201C}Well\u{2026}\u{201D} she said \u{2014} 30\u{00B0} \u{2122}",
            "plain ascii.",
            "\u{266A}\u{200B}\u{FEFF}",
            "",
        ];
        for sample in samples {
            let once = normalize_text(sample);
            assert_eq!(normalize_text(&once), once, "not idempotent for {sample:?}");
        }
    }

    #[test]
    fn test_normalize_into_buffer_reuse() {
        let mut buffer = String::new();
        normalize_text_into("it\u{2019}s", &mut buffer);
        assert_eq!(buffer, "it's");
        normalize_text_into("ok", &mut buffer);
        assert_eq!(buffer, "ok");
    }

    #[test]
    fn test_normalize_word() {
        assert_eq!(normalize_word("Don't"), "dont");
        assert_eq!(normalize_word("stop."), "stop");
        assert_eq!(normalize_word("(Hello!)"), "hello");
        assert_eq!(normalize_word("well-known"), "wellknown");
        assert_eq!(normalize_word("Don\u{2019}t"), "dont");
        assert_eq!(normalize_word("..."), "");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a\r\n\r\nb\t\tc  "), "a b c");
        assert_eq!(collapse_whitespace("   "), "");
    }
}
