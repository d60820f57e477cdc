//! Rubric line classification and per-item evaluation

use serde::Serialize;
use tracing::debug;

use crate::concepts::{Concept, DetectorConfig};
use crate::text::{content_tokens, tokenize};

/// Fraction of a rubric line's content tokens that must appear in the transcript
pub const FUZZY_MATCH_THRESHOLD: f64 = 0.5;

/// Fixed set of rubric categories with a dedicated detection rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RubricCategory {
    DxAppendicitis,
    AppendixSize,
    FatStranding,
    Appendicolith,
    Complications,
    ManagementSurgeryAbx,
}

impl RubricCategory {
    /// Priority order used by [`classify`]; first match wins
    pub const PRIORITY: [RubricCategory; 6] = [
        RubricCategory::DxAppendicitis,
        RubricCategory::AppendixSize,
        RubricCategory::FatStranding,
        RubricCategory::Appendicolith,
        RubricCategory::Complications,
        RubricCategory::ManagementSurgeryAbx,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RubricCategory::DxAppendicitis => "dx_appendicitis",
            RubricCategory::AppendixSize => "appendix_size",
            RubricCategory::FatStranding => "fat_stranding",
            RubricCategory::Appendicolith => "appendicolith",
            RubricCategory::Complications => "complications",
            RubricCategory::ManagementSurgeryAbx => "management_surgery_abx",
        }
    }

    /// Lowercase substrings that select this category
    pub fn triggers(&self) -> &'static [&'static str] {
        match self {
            RubricCategory::DxAppendicitis => &["appendicitis"],
            RubricCategory::AppendixSize => &["enlarged appendix", ">6 mm", "> 6 mm", ">6mm"],
            RubricCategory::FatStranding => &["stranding"],
            RubricCategory::Appendicolith => &["appendicolith", "fecalith", "coprolith"],
            RubricCategory::Complications => {
                &["complication", "perforation", "abscess", "extraluminal"]
            }
            RubricCategory::ManagementSurgeryAbx => {
                &["surgery", "antibiotic", "management", "consult"]
            }
        }
    }

    /// Concepts that satisfy this category; any one is enough
    pub fn concepts(&self) -> &'static [Concept] {
        match self {
            RubricCategory::DxAppendicitis => &[Concept::Appendicitis],
            RubricCategory::AppendixSize => &[Concept::AppendixDilated],
            RubricCategory::FatStranding => &[Concept::Stranding],
            RubricCategory::Appendicolith => &[Concept::Appendicolith],
            RubricCategory::Complications => &[Concept::PerforationAbscess],
            RubricCategory::ManagementSurgeryAbx => {
                &[Concept::SurgeryConsult, Concept::Antibiotics]
            }
        }
    }
}

impl std::fmt::Display for RubricCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a rubric line to its category by keyword containment.
///
/// Categories are tested in [`RubricCategory::PRIORITY`] order, not by where
/// the keyword sits in the line.
pub fn classify(item: &str) -> Option<RubricCategory> {
    let line = item.to_lowercase();
    RubricCategory::PRIORITY
        .into_iter()
        .find(|cat| cat.triggers().iter().any(|t| line.contains(t)))
}

/// How a rubric item was judged
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemMatch {
    pub item: String,
    pub hit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<RubricCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concept: Option<Concept>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote: Option<String>,
    /// Token coverage when the item fell back to fuzzy matching
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverage: Option<f64>,
}

/// Fraction of the item's content tokens found verbatim in the lowercased transcript.
///
/// Items with no long tokens fall back to all of their tokens. `None` when the
/// item has no tokens at all.
pub fn fuzzy_coverage(transcript_lower: &str, item: &str) -> Option<f64> {
    let mut tokens = content_tokens(item);
    if tokens.is_empty() {
        tokens = tokenize(item);
    }
    if tokens.is_empty() {
        return None;
    }
    let found = tokens
        .iter()
        .filter(|t| transcript_lower.contains(t.as_str()))
        .count();
    Some(found as f64 / tokens.len() as f64)
}

/// Judge one rubric item against the transcript
pub fn evaluate_item(transcript: &str, item: &str, config: &DetectorConfig) -> ItemMatch {
    match classify(item) {
        Some(category) => {
            let found = category
                .concepts()
                .iter()
                .map(|c| (*c, c.detect_with(transcript, config)))
                .find(|(_, d)| d.hit);
            debug!(item, category = %category, hit = found.is_some(), "rubric_rule");
            ItemMatch {
                item: item.to_string(),
                hit: found.is_some(),
                category: Some(category),
                concept: found.as_ref().map(|(c, _)| *c),
                quote: found.and_then(|(_, d)| d.quote),
                coverage: None,
            }
        }
        None => {
            let coverage = fuzzy_coverage(&transcript.to_lowercase(), item);
            let hit = coverage.is_some_and(|c| c >= FUZZY_MATCH_THRESHOLD);
            debug!(item, ?coverage, hit, "rubric_fuzzy");
            ItemMatch {
                item: item.to_string(),
                hit,
                category: None,
                concept: None,
                quote: None,
                coverage,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_priority_order() {
        assert_eq!(
            classify("Acute appendicitis"),
            Some(RubricCategory::DxAppendicitis)
        );
        // "stranding" appears first in the text but appendicitis wins on priority
        assert_eq!(
            classify("Stranding supports appendicitis"),
            Some(RubricCategory::DxAppendicitis)
        );
        assert_eq!(
            classify("Appendix >6 mm"),
            Some(RubricCategory::AppendixSize)
        );
        assert_eq!(
            classify("Surgical consult"),
            Some(RubricCategory::ManagementSurgeryAbx)
        );
        assert_eq!(
            classify("Drainable abscess"),
            Some(RubricCategory::Complications)
        );
        assert_eq!(classify("Bilateral echogenic pyramids"), None);
        assert_eq!(classify(""), None);
    }

    #[test]
    fn test_rule_based_item_uses_concept_detection() {
        let config = DetectorConfig::default();
        let m = evaluate_item(
            "Recommend appendectomy.",
            "Management: surgery consult",
            &config,
        );
        assert!(m.hit);
        assert_eq!(m.concept, Some(Concept::SurgeryConsult));
        assert_eq!(m.quote.as_deref(), Some("appendectomy"));

        let m = evaluate_item("Start antibiotics.", "Management: surgery consult", &config);
        assert!(m.hit);
        assert_eq!(m.concept, Some(Concept::Antibiotics));
    }

    #[test]
    fn test_fuzzy_fallback_half_of_content_tokens() {
        let config = DetectorConfig::default();
        let transcript = "Bilateral echogenic kidneys on ultrasound";
        let m = evaluate_item(transcript, "Echogenic medullary pyramids", &config);
        assert_eq!(m.category, None);
        // "echogenic" found, "medullary" and "pyramids" not
        assert!(!m.hit);
        assert!((m.coverage.unwrap() - 1.0 / 3.0).abs() < 1e-9);

        let m = evaluate_item(transcript, "Echogenic kidneys", &config);
        assert!(m.hit);
    }

    #[test]
    fn test_fuzzy_uses_short_tokens_when_no_long_ones() {
        assert_eq!(fuzzy_coverage("dx is msk", "MSK"), Some(1.0));
        assert_eq!(fuzzy_coverage("anything", "the of"), None);
    }

    #[test]
    fn test_empty_item_is_a_miss() {
        let m = evaluate_item("anything at all", "", &DetectorConfig::default());
        assert!(!m.hit);
    }
}
