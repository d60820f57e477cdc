use super::*;
use crate::grade::Letter;
use tempfile::tempdir;

const DAY: i64 = 24 * 60 * 60 * 1000;
const NOW: i64 = 1_760_000_000_000;

fn attempt(case_id: &str, sub: &str, similarity: f64, letter: &str, ts: i64) -> Attempt {
    Attempt {
        ts,
        case_id: case_id.to_string(),
        subspecialty: sub.to_string(),
        similarity,
        rubric_hit: 3,
        rubric_total: 4,
        letter: letter.to_string(),
        kind: AttemptType::Oral,
    }
}

#[test]
fn test_record_appends_without_dedup() {
    let dir = tempdir().unwrap();
    let store = ProgressStore::new(dir.path().join("nested").join(PROGRESS_FILE));

    store.record(attempt("gi-001", "GI", 0.7, "B", NOW)).unwrap();
    store.record(attempt("gi-001", "GI", 0.8, "A", NOW + 1)).unwrap();

    let attempts = store.attempts().unwrap();
    assert_eq!(attempts.len(), 2);
    assert_eq!(attempts[1].letter, "A");
}

#[test]
fn test_missing_and_corrupt_files_load_empty() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(PROGRESS_FILE);
    let store = ProgressStore::new(&path);
    assert!(store.load().unwrap().attempts.is_empty());

    std::fs::write(&path, "{not json").unwrap();
    assert!(store.load().unwrap().attempts.is_empty());

    // Recording over a corrupt file starts a fresh log
    store.record(attempt("gi-001", "GI", 0.5, "C", NOW)).unwrap();
    assert_eq!(store.attempts().unwrap().len(), 1);
}

#[test]
fn test_type_defaults_to_oral() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(PROGRESS_FILE);
    std::fs::write(
        &path,
        r#"{"attempts":[{"ts":1,"caseId":"gu-002","subspecialty":"GU","similarity":0.4,"rubricHit":1,"rubricTotal":3,"letter":"D"}]}"#,
    )
    .unwrap();
    let attempts = ProgressStore::new(&path).attempts().unwrap();
    assert_eq!(attempts[0].kind, AttemptType::Oral);
}

#[test]
fn test_reset_clears_everything() {
    let dir = tempdir().unwrap();
    let store = ProgressStore::new(dir.path().join(PROGRESS_FILE));
    store.record(attempt("a", "GI", 0.5, "C", NOW)).unwrap();
    store.record(attempt("b", "GI", 0.5, "C", NOW)).unwrap();

    assert_eq!(store.reset().unwrap(), 2);
    assert!(store.attempts().unwrap().is_empty());
}

#[test]
fn test_get_stats_aggregates() {
    let mut mcq = attempt("gi-001", "GI", 1.0, "A", NOW);
    mcq.kind = AttemptType::Mcq;
    mcq.rubric_hit = 2;
    mcq.rubric_total = 2;
    let attempts = vec![
        attempt("gi-001", "GI", 0.5, "C", NOW),
        attempt("gi-002", "GI", 0.7, "B", NOW),
        mcq,
        attempt("gu-001", "GU", 0.2, "F", NOW),
    ];

    let stats = get_stats(&attempts, 10);
    assert_eq!(stats.reviewed_count, 3);
    assert_eq!(stats.total_cases, 10);
    assert_eq!(stats.oral_count, 3);
    assert_eq!(stats.mcq_count, 1);
    assert!((stats.avg_mcq_score - 1.0).abs() < 1e-9);

    let gi = &stats.per["GI"];
    assert_eq!(gi.attempts, 3);
    assert_eq!(gi.mean_sim, 73);
    // (3 + 3 + 2) / (4 + 4 + 2)
    assert_eq!(gi.mean_rubric, 80);
    assert_eq!(gi.last_letter, "A");
}

#[test]
fn test_empty_history_stats() {
    let stats = get_stats(&[], 0);
    assert_eq!(stats.reviewed_count, 0);
    assert_eq!(stats.avg_oral_score, 0.0);
    assert!(stats.per.is_empty());
}

#[test]
fn test_time_range_filter() {
    let attempts = vec![
        attempt("old", "GI", 0.1, "F", NOW - 40 * DAY),
        attempt("week", "GI", 0.5, "C", NOW - 3 * DAY),
        attempt("today", "GI", 0.9, "A", NOW - 1000),
    ];
    assert_eq!(TimeRange::Today.filter(&attempts, NOW).len(), 1);
    assert_eq!(TimeRange::Week.filter(&attempts, NOW).len(), 2);
    assert_eq!(TimeRange::Month.filter(&attempts, NOW).len(), 2);
    assert_eq!(TimeRange::All.filter(&attempts, NOW).len(), 3);
    assert!(TimeRange::parse("fortnight").is_err());
    assert_eq!(TimeRange::parse("2weeks").unwrap(), TimeRange::TwoWeeks);
}

#[test]
fn test_progress_report() {
    let attempts = vec![
        attempt("gi-001", "GI", 0.9, "A", NOW - 2 * DAY),
        attempt("gi-001", "GI", 0.7, "B", NOW - DAY - 1),
        attempt("gu-001", "GU", 0.3, "F", NOW - 1000),
        attempt("nr-001", "", 0.65, "X", NOW - 500),
    ];
    let report = progress_report(&attempts, TimeRange::All, NOW, 2);

    let s = &report.summary;
    assert_eq!(s.unique_cases, 3);
    assert_eq!(s.total_attempts, 4);
    assert!((s.avg_per_case - 4.0 / 3.0).abs() < 1e-9);
    assert_eq!(s.avg_score_pct, 64);
    assert_eq!(s.avg_band, ProficiencyBand::NeedsWork);
    assert_eq!(s.most_recent_pct, 65);
    assert_eq!(s.at_risk_subspecialties, 1);

    let subs: Vec<(&str, i64)> = report
        .by_subspecialty
        .iter()
        .map(|s| (s.subspecialty.as_str(), s.mean_pct))
        .collect();
    assert_eq!(subs, vec![("GI", 80), ("GU", 30), ("Unknown", 65)]);

    assert_eq!(report.grades[&Letter::A], 1);
    assert_eq!(report.grades[&Letter::F], 1);
    assert_eq!(report.grades.values().sum::<usize>(), 3);

    assert_eq!(report.lowest.len(), 2);
    assert_eq!(report.lowest[0].case_id, "gu-001");
    assert!(report.trend.len() >= 2);
}

#[test]
fn test_proficiency_bands() {
    assert_eq!(ProficiencyBand::for_pct(75), ProficiencyBand::Proficient);
    assert_eq!(ProficiencyBand::for_pct(60), ProficiencyBand::NeedsWork);
    assert_eq!(ProficiencyBand::for_pct(59), ProficiencyBand::AtRisk);
}
