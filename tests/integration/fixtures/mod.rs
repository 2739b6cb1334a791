// Test fixtures with known practice texts and expected segmentations
// WHY: Golden-file testing requires deterministic input/output pairs for validation

/// Simple single-line text with clear sentence boundaries
pub const SIMPLE_TEXT: &str = "Hello world. This is a test. How are you?";

/// Expected sentences for SIMPLE_TEXT, one per line
pub const SIMPLE_EXPECTED: &str = "Hello world.
This is a test.
How are you?";

/// Multi-line text with blank lines, quotes, abbreviations and an unterminated tail
pub const COMPLEX_TEXT: &str = r#"Hello world. This is a test sentence.

How are you doing today? I hope you're well!

"I am fine," she said. Then she walked away.

Dr. Smith arrived at 9 a.m. Everyone cheered.

This line has no ending punctuation"#;

/// Expected sentences for COMPLEX_TEXT
/// WHY: Line breaks always end a sentence, so the unterminated last line survives on its own
pub const COMPLEX_EXPECTED: &str = r#"Hello world.
This is a test sentence.
How are you doing today?
I hope you're well!
"I am fine," she said.
Then she walked away.
Dr. Smith arrived at 9 a.m.
Everyone cheered.
This line has no ending punctuation"#;

/// Text pasted from a word processor: curly quotes, ellipsis, dashes and odd spaces
pub const TYPOGRAPHIC_TEXT: &str =
    "\u{201C}Wait\u{2026}\u{201D} she whispered.\u{00A0}It\u{2019}s\u{2014}well\u{2014}late! Isn\u{2019}t it?";

/// Expected sentences for TYPOGRAPHIC_TEXT
/// WHY: A closing quote after a terminal run ends the sentence like the run itself
pub const TYPOGRAPHIC_EXPECTED: &str = r#""Wait..."
she whispered.
It's-well-late!
Isn't it?"#;
