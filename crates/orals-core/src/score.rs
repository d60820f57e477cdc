//! Score shape shared by the heuristic scorer and the LLM normalizer

use serde::Serialize;

use crate::rubric::ItemMatch;

/// Weight of a partial rubric hit relative to a full hit
pub const PARTIAL_CREDIT: f64 = 0.5;

/// Clamp into `[0, 1]`, mapping NaN to 0
pub fn clamp01(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

/// Raw overlap counts behind a heuristic similarity
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlapDetails {
    pub uni_hit: usize,
    pub uni_den: usize,
    pub bi_hit: usize,
    pub bi_den: usize,
    pub uni_sim: f64,
    pub bi_sim: f64,
    pub rubric_frac: f64,
}

/// Similarity plus rubric coverage for one graded transcript.
///
/// After scoring or reconciliation `rubric_hit + rubric_partial + rubric_miss`
/// equals the rubric length and `similarity` lies in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    pub similarity: f64,
    pub rubric_hit: usize,
    pub rubric_miss: usize,
    pub rubric_partial: usize,
    pub hits: Vec<String>,
    pub misses: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub partials: Vec<String>,
    pub is_heuristic: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<OverlapDetails>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<ItemMatch>,
}

/// The heuristic scorer's output
pub type HeuristicResult = ScoreResult;

impl ScoreResult {
    /// Zero similarity with every rubric item missed
    pub fn zero(rubric: &[String]) -> Self {
        ScoreResult {
            similarity: 0.0,
            rubric_hit: 0,
            rubric_miss: rubric.len(),
            rubric_partial: 0,
            hits: Vec::new(),
            misses: rubric.to_vec(),
            partials: Vec::new(),
            is_heuristic: false,
            details: None,
            items: Vec::new(),
        }
    }

    pub fn total(&self) -> usize {
        self.rubric_hit + self.rubric_partial + self.rubric_miss
    }

    /// Fraction of rubric items fully hit; partials earn nothing here.
    /// 0 for an empty rubric.
    pub fn rubric_frac(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.rubric_hit as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp01() {
        assert_eq!(clamp01(-0.2), 0.0);
        assert_eq!(clamp01(1.7), 1.0);
        assert_eq!(clamp01(0.42), 0.42);
        assert_eq!(clamp01(f64::NAN), 0.0);
    }

    #[test]
    fn test_zero_score_misses_everything() {
        let rubric = vec!["a".to_string(), "b".to_string()];
        let zero = ScoreResult::zero(&rubric);
        assert_eq!(zero.rubric_miss, 2);
        assert_eq!(zero.misses, rubric);
        assert_eq!(zero.rubric_frac(), 0.0);
        assert_eq!(ScoreResult::zero(&[]).rubric_frac(), 0.0);
    }

    #[test]
    fn test_rubric_frac_counts_hits_only() {
        let mut score = ScoreResult::zero(&[]);
        score.rubric_hit = 7;
        score.rubric_partial = 1;
        score.rubric_miss = 2;
        assert!((score.rubric_frac() - 0.7).abs() < 1e-9);
    }
}
