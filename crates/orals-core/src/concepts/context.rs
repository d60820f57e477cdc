//! Proximity primitives shared by custom concept detectors
//!
//! Windows are measured in characters, not bytes, and every slice is taken
//! on a char boundary so transcripts with non-ASCII punctuation are safe.

use regex::{Match, Regex};

use crate::text::cached_regex;

/// Lookback window in which a negation cue flips a term's polarity
pub const DEFAULT_NEGATION_WINDOW: usize = 40;

/// Maximum distance between the two halves of a compound concept
pub const DEFAULT_COOCCURRENCE_WINDOW: usize = 90;

const NEGATION_CUES: &str = r"(?i)\b(?:no|without|absent|negative\s+for|denies?)\b";

/// Negation never reaches across a sentence or clause break
const CLAUSE_BREAKS: &[char] = &['.', ';', '!', '?', '\n'];

/// Byte index `n` characters before `idx` (clamped to the start of `text`)
fn chars_before(text: &str, idx: usize, n: usize) -> usize {
    text[..idx]
        .char_indices()
        .rev()
        .take(n)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(idx)
}

/// Byte index `n` characters after `idx` (clamped to the end of `text`)
fn chars_after(text: &str, idx: usize, n: usize) -> usize {
    text[idx..]
        .char_indices()
        .nth(n)
        .map(|(i, _)| idx + i)
        .unwrap_or(text.len())
}

/// The text a negation cue must appear in to negate a term starting at `start`
pub fn negation_scope(text: &str, start: usize, window: usize) -> &str {
    let scope = &text[chars_before(text, start, window)..start];
    match scope.rfind(CLAUSE_BREAKS) {
        Some(i) => &scope[i + 1..],
        None => scope,
    }
}

/// Whether the term starting at byte `start` is preceded by a negation cue
pub fn is_negated_at(text: &str, start: usize, window: usize) -> bool {
    let Some(cues) = cached_regex(NEGATION_CUES) else {
        return false;
    };
    cues.is_match(negation_scope(text, start, window))
}

/// Whether any occurrence of `term` in `text` is negated
pub fn is_negated(text: &str, term: &Regex, window: usize) -> bool {
    term.find_iter(text)
        .any(|m| is_negated_at(text, m.start(), window))
}

/// Every match of `anchor` that has a `partner` match within `window`
/// characters on either side, scanned left to right.
pub fn co_occurrences<'t>(
    text: &'t str,
    anchor: &'t Regex,
    partner: &'t Regex,
    window: usize,
) -> impl Iterator<Item = Match<'t>> + 't {
    anchor.find_iter(text).filter(move |m| {
        let start = chars_before(text, m.start(), window);
        let end = chars_after(text, m.end(), window);
        partner.is_match(&text[start..end])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn re(pattern: &str) -> Regex {
        Regex::new(pattern).unwrap()
    }

    fn co_occurs(text: &str, anchor: &Regex, partner: &Regex, window: usize) -> bool {
        co_occurrences(text, anchor, partner, window)
            .next()
            .is_some()
    }

    #[test]
    fn test_negation_cue_within_window() {
        let text = "There is no hydronephrosis.";
        let start = text.find("hydronephrosis").unwrap();
        assert!(is_negated_at(text, start, DEFAULT_NEGATION_WINDOW));
    }

    #[test]
    fn test_negation_cue_outside_window() {
        let text = "No acute findings in the chest wall, and the liver shows hydronephrosis";
        let start = text.find("hydronephrosis").unwrap();
        assert!(!is_negated_at(text, start, 20));
    }

    #[test]
    fn test_negation_stops_at_sentence_break() {
        let text = "No appendicolith. Recommend surgery.";
        let start = text.find("surgery").unwrap();
        assert!(!is_negated_at(text, start, DEFAULT_NEGATION_WINDOW));
    }

    #[test]
    fn test_negation_cue_variants() {
        for text in [
            "negative for appendicolith",
            "without appendicolith",
            "patient denies appendicolith",
            "appendicolith absent; absent appendicolith",
        ] {
            assert!(
                is_negated(text, &re(r"(?i)appendicolith"), DEFAULT_NEGATION_WINDOW),
                "expected negation in {text:?}"
            );
        }
    }

    #[test]
    fn test_negation_requires_whole_word_cue() {
        let text = "Normal appendicolith";
        assert!(!is_negated(
            text,
            &re(r"(?i)appendicolith"),
            DEFAULT_NEGATION_WINDOW
        ));
    }

    #[test]
    fn test_co_occurs_scans_every_anchor() {
        // First "bright" is far from any pyramid mention; the second is close.
        let filler = "unrelated words ".repeat(10);
        let text = format!("bright liver {filler} and a bright signal in the pyramids");
        assert!(co_occurs(
            &text,
            &re(r"(?i)\bbright\b"),
            &re(r"(?i)\bpyramids?\b"),
            DEFAULT_COOCCURRENCE_WINDOW
        ));
    }

    #[test]
    fn test_window_slicing_is_char_safe() {
        let text = "échogène — échogène bright … pyramids";
        assert!(co_occurs(
            text,
            &re(r"(?i)\bbright\b"),
            &re(r"(?i)\bpyramids\b"),
            15
        ));
        assert!(!co_occurs(
            text,
            &re(r"(?i)\bbright\b"),
            &re(r"(?i)\bpyramids\b"),
            5
        ));
        let start = text.find("pyramids").unwrap();
        let _ = negation_scope(text, start, 3);
    }
}
