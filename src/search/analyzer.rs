//! Word-level metrics computed over a book description.

use std::collections::HashSet;

/// Characters that separate words in a description.
const DELIMITERS: [char; 13] = [
    ' ', '\t', '\n', '\r', '\\', '-', '"', '.', ',', ';', ':', '!', '?',
];

/// Metrics derived from a single description.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextMetrics {
    /// Words whose first character is an uppercase letter.
    pub uppercase_words: usize,
    /// Distinct words after lowercase folding.
    pub unique_words: usize,
}

/// Split text into non-empty words.
pub fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    text.split(&DELIMITERS[..]).filter(|token| !token.is_empty())
}

/// Compute word metrics for a description. Total over all inputs.
pub fn analyze(description: &str) -> TextMetrics {
    let mut uppercase_words = 0;
    let mut seen: HashSet<String> = HashSet::new();

    for token in tokenize(description) {
        if token.chars().next().is_some_and(char::is_uppercase) {
            uppercase_words += 1;
        }
        seen.insert(token.to_lowercase());
    }

    TextMetrics {
        uppercase_words,
        unique_words: seen.len(),
    }
}
