//! Local transcript scoring: lexical overlap blended with rubric coverage

mod feedback;

pub use feedback::heuristic_feedback;

use std::collections::HashSet;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::concepts::DetectorConfig;
use crate::rubric::evaluate_item;
use crate::score::{clamp01, HeuristicResult, OverlapDetails};
use crate::text::{bigrams, pattern_cache_metrics, tokenize};
use crate::{log_cache_metrics, trace_time};

/// How the overlap and rubric signals combine into one similarity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum BlendStrategy {
    /// Heuristic is authoritative: weighted sum of all three signals
    Weighted {
        unigram: f64,
        bigram: f64,
        rubric: f64,
    },
    /// Conservative placeholder pending LLM judgement: scaled rubric coverage
    Provisional { scale: f64 },
}

impl BlendStrategy {
    pub const fn weighted() -> Self {
        BlendStrategy::Weighted {
            unigram: 0.4,
            bigram: 0.3,
            rubric: 0.3,
        }
    }

    pub const fn provisional() -> Self {
        BlendStrategy::Provisional { scale: 0.8 }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BlendStrategy::Weighted { .. } => "weighted",
            BlendStrategy::Provisional { .. } => "provisional",
        }
    }

    /// Parse a preset name as accepted on the command line
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "weighted" => Some(Self::weighted()),
            "provisional" => Some(Self::provisional()),
            _ => None,
        }
    }

    fn blend(&self, uni_sim: f64, bi_sim: f64, rubric_frac: f64) -> f64 {
        let raw = match *self {
            BlendStrategy::Weighted {
                unigram,
                bigram,
                rubric,
            } => unigram * uni_sim + bigram * bi_sim + rubric * rubric_frac,
            BlendStrategy::Provisional { scale } => scale * rubric_frac,
        };
        clamp01(raw)
    }
}

impl Default for BlendStrategy {
    fn default() -> Self {
        Self::weighted()
    }
}

/// Everything the heuristic scorer reads
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicInput<'a> {
    pub transcript: &'a str,
    pub prompt: &'a str,
    pub expected: &'a str,
    pub rubric: &'a [String],
}

/// Count of `items` present in `vocab`, and the share of the vocabulary that represents
fn overlap(items: &[String], vocab: &HashSet<&str>) -> (usize, usize, f64) {
    let hit = items.iter().filter(|t| vocab.contains(t.as_str())).count();
    let den = vocab.len().max(1);
    (hit, den, clamp01(hit as f64 / den as f64))
}

/// Score with the default blend and detector windows
pub fn grade_heuristic(input: &HeuristicInput<'_>) -> HeuristicResult {
    grade_heuristic_with(input, &BlendStrategy::default(), &DetectorConfig::default())
}

/// Score a transcript against the case text and rubric.
///
/// Pure and total: empty inputs give zero similarity, never NaN.
pub fn grade_heuristic_with(
    input: &HeuristicInput<'_>,
    blend: &BlendStrategy,
    detectors: &DetectorConfig,
) -> HeuristicResult {
    let start = Instant::now();

    let transcript_tokens = tokenize(input.transcript);
    let case_tokens: Vec<String> = tokenize(input.prompt)
        .into_iter()
        .chain(tokenize(input.expected))
        .collect();
    let case_bigrams: Vec<String> = bigrams(&tokenize(input.prompt))
        .into_iter()
        .chain(bigrams(&tokenize(input.expected)))
        .collect();

    let uni_vocab: HashSet<&str> = case_tokens.iter().map(String::as_str).collect();
    let bi_vocab: HashSet<&str> = case_bigrams.iter().map(String::as_str).collect();
    let (uni_hit, uni_den, uni_sim) = overlap(&transcript_tokens, &uni_vocab);
    let (bi_hit, bi_den, bi_sim) = overlap(&bigrams(&transcript_tokens), &bi_vocab);

    let items: Vec<_> = input
        .rubric
        .iter()
        .map(|item| evaluate_item(input.transcript, item, detectors))
        .collect();
    let (hit_items, miss_items): (Vec<_>, Vec<_>) = items.iter().partition(|m| m.hit);
    let hits: Vec<String> = hit_items.iter().map(|m| m.item.clone()).collect();
    let misses: Vec<String> = miss_items.iter().map(|m| m.item.clone()).collect();

    let rubric_frac = if input.rubric.is_empty() {
        0.0
    } else {
        hits.len() as f64 / input.rubric.len() as f64
    };
    let similarity = blend.blend(uni_sim, bi_sim, rubric_frac);

    debug!(
        blend = blend.name(),
        uni_sim,
        bi_sim,
        rubric_frac,
        similarity,
        "heuristic_score"
    );
    trace_time!(start, "grade_heuristic", rubric_items = input.rubric.len());
    log_cache_metrics!(pattern_cache_metrics(), "grade_heuristic");

    HeuristicResult {
        similarity,
        rubric_hit: hits.len(),
        rubric_miss: misses.len(),
        rubric_partial: 0,
        hits,
        misses,
        partials: Vec::new(),
        is_heuristic: true,
        details: Some(OverlapDetails {
            uni_hit,
            uni_den,
            bi_hit,
            bi_den,
            uni_sim,
            bi_sim,
            rubric_frac,
        }),
        items,
    }
}
