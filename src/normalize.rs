//! Whitespace collapsing and character-budget truncation applied before inference.
//!
//! Truncation counts characters, not tokens, and may cut a word in half.

use std::fmt;

/// Character budget used when none is configured.
pub const DEFAULT_MAX_CHARS: usize = 3500;

/// Collapse whitespace runs to single spaces, trim, then keep at most `max_chars` characters.
pub fn normalize(raw: &str, max_chars: usize) -> String {
    let mut out = String::with_capacity(raw.len().min(max_chars.saturating_mul(4)));
    let mut kept = 0usize;

    for word in raw.split_whitespace() {
        if kept >= max_chars {
            break;
        }
        if kept > 0 {
            out.push(' ');
            kept += 1;
            if kept >= max_chars {
                break;
            }
        }
        for ch in word.chars() {
            if kept >= max_chars {
                break;
            }
            out.push(ch);
            kept += 1;
        }
    }

    // A cut right after a word leaves a dangling separator.
    let trimmed = out.trim_end().len();
    out.truncate(trimmed);
    out
}

/// Text that has been through [`normalize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedInput(String);

impl NormalizedInput {
    pub fn new(raw: &str, max_chars: usize) -> Self {
        Self(normalize(raw, max_chars))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Length in characters.
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }
}

impl AsRef<str> for NormalizedInput {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn collapses_mixed_whitespace() {
        let raw = "  Revenue\tgrew\n\n 8%   on   pricing.\r\n";
        assert_eq!(normalize(raw, DEFAULT_MAX_CHARS), "Revenue grew 8% on pricing.");
    }

    #[test]
    fn truncation_may_split_a_word() {
        assert_eq!(normalize("margins compressed", 10), "margins co");
    }

    #[test]
    fn truncation_does_not_leave_trailing_space() {
        assert_eq!(normalize("ab cd", 3), "ab");
    }

    #[test]
    fn counts_characters_not_bytes() {
        let out = normalize("€€€€ ¥¥", 5);
        assert_eq!(out, "€€€€");
        assert_eq!(normalize("€€€ ¥¥", 6), "€€€ ¥¥");
    }

    #[test]
    fn blank_and_zero_budget_yield_empty() {
        assert_eq!(normalize(" \n\t ", 100), "");
        assert_eq!(normalize("anything", 0), "");
        assert!(NormalizedInput::new("   ", DEFAULT_MAX_CHARS).is_empty());
    }

    #[test]
    fn default_budget_caps_long_transcripts() {
        let raw = "guidance ".repeat(1000);
        let input = NormalizedInput::new(&raw, DEFAULT_MAX_CHARS);
        assert!(input.char_len() <= DEFAULT_MAX_CHARS);
        assert!(input.as_str().starts_with("guidance guidance"));
    }

    proptest! {
        #[test]
        fn prop_length_bound(s in "\\PC{0,400}", n in 1usize..300) {
            prop_assert!(normalize(&s, n).chars().count() <= n);
        }

        #[test]
        fn prop_idempotent(s in "[a-z \\t\\n€]{0,300}", n in 1usize..200) {
            let once = normalize(&s, n);
            prop_assert_eq!(normalize(&once, n), once.clone());
        }

        #[test]
        fn prop_no_edge_or_double_spaces(s in "\\PC{0,300}", n in 1usize..200) {
            let out = normalize(&s, n);
            prop_assert!(!out.starts_with(' ') && !out.ends_with(' '));
            prop_assert!(!out.contains("  "));
        }
    }
}
