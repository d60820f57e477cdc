use std::collections::{BTreeMap, HashSet};

use chrono::DateTime;
use serde::Serialize;

use super::{Attempt, AttemptType};
use crate::error::{OralsError, Result};
use crate::grade::Letter;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Percent scores at or above this are proficient
pub const PROFICIENT_PCT: i64 = 75;
/// Percent scores at or above this (and below proficient) need work
pub const NEEDS_WORK_PCT: i64 = 60;

fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, n) = values
        .into_iter()
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

fn pct(fraction: f64) -> i64 {
    (fraction * 100.0).round() as i64
}

/// Per-subspecialty aggregate
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubspecialtyStats {
    pub attempts: usize,
    /// Mean similarity, percent
    pub mean_sim: i64,
    /// Rubric hits over rubric items across all attempts, percent
    pub mean_rubric: i64,
    pub last_letter: String,
    pub hits: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub reviewed_count: usize,
    pub total_cases: usize,
    pub per: BTreeMap<String, SubspecialtyStats>,
    pub attempt_count: usize,
    pub oral_count: usize,
    pub mcq_count: usize,
    pub avg_oral_score: f64,
    pub avg_mcq_score: f64,
}

/// Aggregate the whole history; recomputed from scratch on every call
pub fn get_stats(attempts: &[Attempt], total_cases: usize) -> Stats {
    let reviewed: HashSet<&str> = attempts.iter().map(|a| a.case_id.as_str()).collect();

    let mut per: BTreeMap<String, (usize, f64, usize, usize, String)> = BTreeMap::new();
    for a in attempts {
        let entry = per
            .entry(a.subspecialty.clone())
            .or_insert_with(|| (0, 0.0, 0, 0, "-".to_string()));
        entry.0 += 1;
        entry.1 += a.similarity;
        entry.2 += a.rubric_hit;
        entry.3 += a.rubric_total;
        entry.4 = a.letter.clone();
    }
    let per = per
        .into_iter()
        .map(|(sub, (n, sim, hits, total, last))| {
            let stats = SubspecialtyStats {
                attempts: n,
                mean_sim: if n == 0 { 0 } else { pct(sim / n as f64) },
                mean_rubric: if total == 0 {
                    0
                } else {
                    pct(hits as f64 / total as f64)
                },
                last_letter: last,
                hits,
                total,
            };
            (sub, stats)
        })
        .collect();

    let of_kind = |kind: AttemptType| attempts.iter().filter(move |a| a.kind == kind);

    Stats {
        reviewed_count: reviewed.len(),
        total_cases,
        per,
        attempt_count: attempts.len(),
        oral_count: of_kind(AttemptType::Oral).count(),
        mcq_count: of_kind(AttemptType::Mcq).count(),
        avg_oral_score: mean(of_kind(AttemptType::Oral).map(|a| a.similarity)),
        avg_mcq_score: mean(of_kind(AttemptType::Mcq).map(|a| a.similarity)),
    }
}

/// Reporting window for progress analytics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    Today,
    Week,
    #[serde(rename = "2weeks")]
    TwoWeeks,
    Month,
    #[default]
    All,
}

impl TimeRange {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "today" => Ok(TimeRange::Today),
            "week" | "7d" => Ok(TimeRange::Week),
            "2weeks" | "14d" => Ok(TimeRange::TwoWeeks),
            "month" | "30d" => Ok(TimeRange::Month),
            "all" => Ok(TimeRange::All),
            other => Err(OralsError::unsupported(
                "range",
                other,
                "today, week, 2weeks, month, all",
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::Today => "today",
            TimeRange::Week => "week",
            TimeRange::TwoWeeks => "2weeks",
            TimeRange::Month => "month",
            TimeRange::All => "all",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeRange::Today => "Today",
            TimeRange::Week => "Last 7 Days",
            TimeRange::TwoWeeks => "Last 14 Days",
            TimeRange::Month => "Last 30 Days",
            TimeRange::All => "All Time",
        }
    }

    /// Earliest timestamp (ms) inside the window ending at `now_ms`
    pub fn cutoff(&self, now_ms: i64) -> i64 {
        match self {
            TimeRange::Today => now_ms - DAY_MS,
            TimeRange::Week => now_ms - 7 * DAY_MS,
            TimeRange::TwoWeeks => now_ms - 14 * DAY_MS,
            TimeRange::Month => now_ms - 30 * DAY_MS,
            TimeRange::All => i64::MIN,
        }
    }

    pub fn filter<'a>(&self, attempts: &'a [Attempt], now_ms: i64) -> Vec<&'a Attempt> {
        let cutoff = self.cutoff(now_ms);
        attempts.iter().filter(|a| a.ts >= cutoff).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProficiencyBand {
    Proficient,
    NeedsWork,
    AtRisk,
}

impl ProficiencyBand {
    pub fn for_pct(score_pct: i64) -> Self {
        if score_pct >= PROFICIENT_PCT {
            ProficiencyBand::Proficient
        } else if score_pct >= NEEDS_WORK_PCT {
            ProficiencyBand::NeedsWork
        } else {
            ProficiencyBand::AtRisk
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProficiencyBand::Proficient => "Proficient",
            ProficiencyBand::NeedsWork => "Needs Work",
            ProficiencyBand::AtRisk => "At Risk",
        }
    }
}

/// Mean score for one UTC calendar day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub day: String,
    pub mean_pct: i64,
    pub attempts: usize,
}

pub fn daily_trend(attempts: &[&Attempt]) -> Vec<TrendPoint> {
    let mut by_day: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for a in attempts {
        let day = DateTime::from_timestamp_millis(a.ts)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "unknown".to_string());
        by_day.entry(day).or_default().push(a.similarity);
    }
    by_day
        .into_iter()
        .map(|(day, sims)| TrendPoint {
            day,
            attempts: sims.len(),
            mean_pct: pct(mean(sims)),
        })
        .collect()
}

/// Attempts per letter, A through F; unrecognized letters are skipped
pub fn grade_distribution(attempts: &[&Attempt]) -> BTreeMap<Letter, usize> {
    let mut counts: BTreeMap<Letter, usize> = Letter::ALL.iter().map(|l| (*l, 0)).collect();
    for a in attempts {
        if let Some(letter) = Letter::parse(&a.letter) {
            *counts.entry(letter).or_default() += 1;
        }
    }
    counts
}

/// The `n` lowest-similarity attempts, ascending
pub fn lowest_scores<'a>(attempts: &[&'a Attempt], n: usize) -> Vec<&'a Attempt> {
    let mut sorted = attempts.to_vec();
    sorted.sort_by(|a, b| a.similarity.total_cmp(&b.similarity));
    sorted.truncate(n);
    sorted
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubspecialtyScore {
    pub subspecialty: String,
    pub mean_pct: i64,
    pub band: ProficiencyBand,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub range: TimeRange,
    pub range_label: &'static str,
    pub unique_cases: usize,
    pub total_attempts: usize,
    pub avg_per_case: f64,
    pub avg_score_pct: i64,
    pub avg_band: ProficiencyBand,
    pub most_recent_pct: i64,
    pub at_risk_subspecialties: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    pub summary: Summary,
    pub trend: Vec<TrendPoint>,
    pub by_subspecialty: Vec<SubspecialtyScore>,
    pub grades: BTreeMap<Letter, usize>,
    pub lowest: Vec<Attempt>,
}

/// Dashboard-style analytics over the attempts inside `range`
pub fn progress_report(
    attempts: &[Attempt],
    range: TimeRange,
    now_ms: i64,
    lowest_n: usize,
) -> ProgressReport {
    let rows = range.filter(attempts, now_ms);

    let unique_cases = rows
        .iter()
        .map(|a| a.case_id.as_str())
        .collect::<HashSet<_>>()
        .len();

    let mut by_sub: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for a in &rows {
        let sub = if a.subspecialty.is_empty() {
            "Unknown"
        } else {
            a.subspecialty.as_str()
        };
        by_sub.entry(sub).or_default().push(a.similarity);
    }
    let by_subspecialty: Vec<SubspecialtyScore> = by_sub
        .into_iter()
        .map(|(sub, sims)| {
            let mean_pct = pct(mean(sims));
            SubspecialtyScore {
                subspecialty: sub.to_string(),
                mean_pct,
                band: ProficiencyBand::for_pct(mean_pct),
            }
        })
        .collect();

    let avg_score_pct = pct(mean(rows.iter().map(|a| a.similarity)));
    // Log order is append order, so the last row is the most recent
    let most_recent_pct = rows.last().map(|a| pct(a.similarity)).unwrap_or(0);

    let summary = Summary {
        range,
        range_label: range.label(),
        unique_cases,
        total_attempts: rows.len(),
        avg_per_case: rows.len() as f64 / unique_cases.max(1) as f64,
        avg_score_pct,
        avg_band: ProficiencyBand::for_pct(avg_score_pct),
        most_recent_pct,
        at_risk_subspecialties: by_subspecialty
            .iter()
            .filter(|s| s.band == ProficiencyBand::AtRisk)
            .count(),
    };

    ProgressReport {
        summary,
        trend: daily_trend(&rows),
        by_subspecialty,
        grades: grade_distribution(&rows),
        lowest: lowest_scores(&rows, lowest_n)
            .into_iter()
            .cloned()
            .collect(),
    }
}
