//! Word-boundary phrase matching with simple variant expansion

use regex::Regex;

use crate::text::cached_regex;

/// Regex fragment for one word of a phrase, expanding known variants
fn word_fragment(word: &str) -> String {
    match word.to_lowercase().as_str() {
        "consult" | "consultation" => "(?:consult|consultation)".to_string(),
        "antibiotic" | "antibiotics" => "antibiotics?".to_string(),
        "appendix" | "appendices" => "append(?:ix|ices)".to_string(),
        _ => regex::escape(word),
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Build the case-insensitive pattern source for a phrase.
///
/// Words are joined by `\s+` so line breaks and double spaces in a spoken
/// transcript still match. Boundaries are only anchored on word characters,
/// so phrases such as ">6 mm" still match at their leading `>`.
pub fn phrase_pattern(phrase: &str) -> String {
    let phrase = phrase.trim();
    let body = phrase
        .split_whitespace()
        .map(word_fragment)
        .collect::<Vec<_>>()
        .join(r"\s+");

    let lead = if phrase.starts_with(is_word_char) { r"\b" } else { "" };
    let tail = if phrase.ends_with(is_word_char) { r"\b" } else { "" };
    format!("(?i){lead}{body}{tail}")
}

/// Compiled (and cached) matcher for a phrase
pub fn phrase_regex(phrase: &str) -> Option<Regex> {
    if phrase.trim().is_empty() {
        return None;
    }
    cached_regex(&phrase_pattern(phrase))
}
