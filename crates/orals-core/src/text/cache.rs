//! Process-wide cache of compiled regular expressions
//!
//! Concept patterns and phrase matchers are compiled on first use and shared
//! afterwards. `Regex` clones are reference-counted, so handing out clones
//! is cheap.

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

use regex::Regex;

use crate::logging::CacheMetrics;

static CACHE: OnceLock<Mutex<HashMap<String, Regex>>> = OnceLock::new();
static METRICS: CacheMetrics = CacheMetrics::new();

/// Compile `pattern` once and return the cached regex.
///
/// An invalid pattern is logged and yields `None`; callers treat that as a
/// non-match rather than failing the grading pass.
pub fn cached_regex(pattern: &str) -> Option<Regex> {
    let cache = CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    let mut guard = match cache.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };

    if let Some(re) = guard.get(pattern) {
        METRICS.record_hit();
        return Some(re.clone());
    }

    METRICS.record_miss();
    match Regex::new(pattern) {
        Ok(re) => {
            guard.insert(pattern.to_string(), re.clone());
            Some(re)
        }
        Err(e) => {
            tracing::warn!(pattern, error = %e, "invalid pattern");
            None
        }
    }
}

/// Hit/miss counters for the pattern cache
pub fn pattern_cache_metrics() -> &'static CacheMetrics {
    &METRICS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cached_regex_reuses_compiled_pattern() {
        let pattern = r"(?i)\bcache-test-token\b";
        let first = cached_regex(pattern).unwrap();
        let hits_before = pattern_cache_metrics().hits();
        let second = cached_regex(pattern).unwrap();

        assert_eq!(first.as_str(), second.as_str());
        assert!(pattern_cache_metrics().hits() > hits_before);
        assert!(second.is_match("a CACHE-TEST-TOKEN here"));
    }

    #[test]
    fn test_invalid_pattern_yields_none() {
        assert!(cached_regex(r"(unclosed").is_none());
    }
}
