use crate::score::ScoreResult;

const TIP: &str =
    "Tip: Lead with the diagnosis, cite 2–3 key imaging findings, and state concrete management.";

/// Human-readable summary of a locally computed score
pub fn heuristic_feedback(score: &ScoreResult) -> String {
    let mut lines = vec![
        format!(
            "Similarity to case focus: {}%",
            (score.similarity * 100.0).round() as i64
        ),
        format!(
            "Rubric coverage: {} hit(s), {} missing",
            score.rubric_hit, score.rubric_miss
        ),
    ];
    if !score.hits.is_empty() {
        lines.push(format!("✔ Covered: {}", score.hits.join("; ")));
    }
    if !score.partials.is_empty() {
        lines.push(format!("◐ Partial: {}", score.partials.join("; ")));
    }
    if !score.misses.is_empty() {
        lines.push(format!("✖ Missing/unclear: {}", score.misses.join("; ")));
    }
    lines.push(String::new());
    lines.push(TIP.to_string());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_lists_covered_and_missing() {
        let mut score = ScoreResult::zero(&["appendicolith".to_string()]);
        score.similarity = 0.456;
        score.rubric_hit = 1;
        score.hits = vec!["acute appendicitis".to_string()];

        let text = heuristic_feedback(&score);
        assert!(text.starts_with("Similarity to case focus: 46%"));
        assert!(text.contains("Rubric coverage: 1 hit(s), 1 missing"));
        assert!(text.contains("✔ Covered: acute appendicitis"));
        assert!(text.contains("✖ Missing/unclear: appendicolith"));
        assert!(text.ends_with(TIP));
    }

    #[test]
    fn test_feedback_omits_empty_lists() {
        let text = heuristic_feedback(&ScoreResult::zero(&[]));
        assert!(!text.contains("Covered"));
        assert!(!text.contains("Missing/unclear"));
    }
}
