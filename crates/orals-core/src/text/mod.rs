//! Text processing utilities for tokenization and n-gram overlap

mod cache;

pub use cache::{cached_regex, pattern_cache_metrics};

use std::collections::HashSet;
use std::sync::OnceLock;

/// English function words dropped during tokenization
static STOP_WORDS: OnceLock<HashSet<&'static str>> = OnceLock::new();

/// Minimum character length for a token to count as content in fuzzy rubric matching
pub const CONTENT_TOKEN_MIN_CHARS: usize = 4;

fn get_stop_words() -> &'static HashSet<&'static str> {
    STOP_WORDS.get_or_init(|| {
        [
            "a", "an", "the", "of", "and", "or", "to", "in", "on", "with", "without", "for",
            "at", "by", "from", "into", "over", "under", "about", "above", "below", "between",
            "across", "as", "is", "are", "was", "were", "be", "being", "been", "this", "that",
            "these", "those", "there", "here", "it", "its", "it's", "your", "you", "we", "they",
            "he", "she", "his", "her", "their", "our",
        ]
        .iter()
        .copied()
        .collect()
    })
}

/// Whether a character survives normalization.
///
/// `>` is kept so thresholds like ">6 mm" stay intact, `-` so hyphenated
/// terms such as "peri-appendiceal" stay one token.
fn is_kept(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || c == '-' || c == '>'
}

/// Lowercase, blank out punctuation, split on whitespace, drop stop words.
///
/// Total over all input: empty text yields an empty vector.
pub fn tokenize(text: &str) -> Vec<String> {
    let stop_words = get_stop_words();
    let normalized: String = text
        .to_lowercase()
        .chars()
        .map(|c| if is_kept(c) { c } else { ' ' })
        .collect();

    normalized
        .split_whitespace()
        .filter(|s| !stop_words.contains(s))
        .map(|s| s.to_string())
        .collect()
}

/// Adjacent token pairs joined by a single space
pub fn bigrams(tokens: &[String]) -> Vec<String> {
    tokens
        .windows(2)
        .map(|pair| format!("{} {}", pair[0], pair[1]))
        .collect()
}

/// Tokens long enough to carry meaning on their own (more than three characters)
pub fn content_tokens(text: &str) -> Vec<String> {
    tokenize(text)
        .into_iter()
        .filter(|t| t.chars().count() >= CONTENT_TOKEN_MIN_CHARS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_basic() {
        let tokens = tokenize("The appendix is dilated.");
        assert_eq!(tokens, vec!["appendix", "dilated"]);
    }

    #[test]
    fn test_tokenize_keeps_threshold_marker() {
        let tokens = tokenize("Appendix >6 mm, noncompressible");
        assert_eq!(tokens, vec!["appendix", ">6", "mm", "noncompressible"]);
    }

    #[test]
    fn test_tokenize_keeps_hyphenated_terms() {
        let tokens = tokenize("Peri-appendiceal fat stranding");
        assert_eq!(tokens, vec!["peri-appendiceal", "fat", "stranding"]);
    }

    #[test]
    fn test_tokenize_empty_input() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \n\t").is_empty());
    }

    #[test]
    fn test_tokenize_only_stop_words() {
        assert_eq!(tokenize("the a an and or"), Vec::<String>::new());
    }

    #[test]
    fn test_tokenize_is_deterministic() {
        let text = "Acute appendicitis with periappendiceal stranding";
        assert_eq!(tokenize(text), tokenize(text));
    }

    #[test]
    fn test_bigrams_length() {
        let tokens = tokenize("acute appendicitis periappendiceal stranding");
        let pairs = bigrams(&tokens);
        assert_eq!(
            pairs,
            vec![
                "acute appendicitis",
                "appendicitis periappendiceal",
                "periappendiceal stranding"
            ]
        );
        assert!(bigrams(&tokens[..1]).is_empty());
        assert!(bigrams(&[]).is_empty());
    }

    #[test]
    fn test_content_tokens_drop_short_words() {
        let tokens = content_tokens("CT of the RLQ shows fat stranding");
        assert_eq!(tokens, vec!["shows", "stranding"]);
    }
}
