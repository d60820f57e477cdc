//! One grading pass over a case: heuristic score, optional LLM feedback, letter
//!
//! The pass never fails. Transport errors and unreadable LLM replies end up
//! as sections of the feedback text, with the heuristic score kept as the
//! fallback where the mode allows it.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cases::Case;
use crate::concepts::DetectorConfig;
use crate::error::{OralsError, Result};
use crate::grade::{Letter, ThresholdTable};
use crate::heuristic::{grade_heuristic_with, heuristic_feedback, BlendStrategy, HeuristicInput};
use crate::llm::{build_payload, normalize_response, FeedbackTransport, Normalized};
use crate::mcq::McqResult;
use crate::progress::{Attempt, AttemptType};
use crate::score::ScoreResult;
use crate::trace_time;

pub const LLM_FEEDBACK_HEADER: &str = "— LLM feedback —";
pub const LLM_ERROR_HEADER: &str = "— LLM error —";

/// Which source decides the final score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackMode {
    /// Local scoring only; no network call
    #[default]
    Heuristic,
    /// The normalized LLM score, zero when the reply cannot be read
    Llm,
    /// The normalized LLM score when readable, else the heuristic score
    Hybrid,
}

impl FeedbackMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackMode::Heuristic => "heuristic",
            FeedbackMode::Llm => "llm",
            FeedbackMode::Hybrid => "hybrid",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "heuristic" => Ok(FeedbackMode::Heuristic),
            "llm" => Ok(FeedbackMode::Llm),
            "hybrid" => Ok(FeedbackMode::Hybrid),
            other => Err(OralsError::unsupported(
                "feedback mode",
                other,
                "heuristic, llm, hybrid",
            )),
        }
    }

    pub fn uses_llm(&self) -> bool {
        !matches!(self, FeedbackMode::Heuristic)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreSource {
    Heuristic,
    Llm,
}

impl ScoreSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreSource::Heuristic => "heuristic",
            ScoreSource::Llm => "llm",
        }
    }
}

/// Everything one grading pass produced
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradedAttempt {
    pub case_id: String,
    pub mode: FeedbackMode,
    pub source: ScoreSource,
    pub score: ScoreResult,
    pub letter: Letter,
    pub feedback: String,
    pub heuristic: ScoreResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm: Option<Normalized>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_error: Option<String>,
}

impl GradedAttempt {
    /// The attempt to append to the progress log
    pub fn to_attempt(&self, case: &Case) -> Attempt {
        Attempt::now(
            &case.id,
            &case.subspecialty,
            self.score.similarity,
            self.score.rubric_hit,
            case.rubric.len(),
            self.letter.as_str(),
            AttemptType::Oral,
        )
    }
}

/// Grading settings resolved from configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grader {
    pub mode: FeedbackMode,
    pub blend: BlendStrategy,
    pub detectors: DetectorConfig,
    pub thresholds: ThresholdTable,
}

/// Message shown for a failed call; transport errors carry their own text
fn error_text(error: &OralsError) -> String {
    match error {
        OralsError::Transport(msg) => msg.clone(),
        other => format!("LLM transport error: {other}"),
    }
}

impl Grader {
    #[tracing::instrument(skip(self, case, transcript, transport), fields(case_id = %case.id, mode = self.mode.as_str()))]
    pub fn grade_case(
        &self,
        case: &Case,
        transcript: &str,
        transport: Option<&dyn FeedbackTransport>,
    ) -> GradedAttempt {
        let start = Instant::now();

        let heuristic = grade_heuristic_with(
            &HeuristicInput {
                transcript,
                prompt: case.prompt(),
                expected: case.expected(),
                rubric: &case.rubric,
            },
            &self.blend,
            &self.detectors,
        );
        let mut feedback = heuristic_feedback(&heuristic);

        let (llm, llm_error) = if self.mode.uses_llm() {
            let reply = match transport {
                Some(transport) => transport.send(&build_payload(case, transcript, &heuristic)),
                None => Err(OralsError::Transport(
                    "LLM transport error: no feedback endpoint configured".to_string(),
                )),
            };
            match reply {
                Ok(body) => (Some(normalize_response(&body, &case.rubric)), None),
                Err(e) => {
                    warn!(error = %e, "LLM feedback unavailable, keeping heuristic score");
                    (None, Some(error_text(&e)))
                }
            }
        } else {
            (None, None)
        };

        if let Some(normalized) = &llm {
            feedback.push_str(&format!("\n\n{LLM_FEEDBACK_HEADER}\n{}", normalized.feedback));
        }
        if let Some(error) = &llm_error {
            feedback.push_str(&format!("\n\n{LLM_ERROR_HEADER}\n{error}"));
        }

        let (source, score) = match (&self.mode, &llm) {
            (FeedbackMode::Llm, Some(n)) => (ScoreSource::Llm, n.score.clone()),
            (FeedbackMode::Hybrid, Some(n)) if n.parsed() => (ScoreSource::Llm, n.score.clone()),
            _ => (ScoreSource::Heuristic, heuristic.clone()),
        };
        let letter = self.thresholds.letter(&score);

        debug!(
            source = ?source,
            similarity = score.similarity,
            rubric_hit = score.rubric_hit,
            letter = letter.as_str(),
            "graded"
        );
        trace_time!(start, "grade_case");

        GradedAttempt {
            case_id: case.id.clone(),
            mode: self.mode,
            source,
            score,
            letter,
            feedback,
            heuristic,
            llm,
            llm_error,
        }
    }

    /// Attempt for a graded MCQ set; the letter uses the fraction correct for both signals
    pub fn mcq_attempt(&self, case: &Case, result: &McqResult) -> (Letter, Attempt) {
        let similarity = result.similarity();
        let letter = self.thresholds.letter_for(similarity, similarity);
        let attempt = Attempt::now(
            &case.id,
            &case.subspecialty,
            similarity,
            result.correct,
            result.total,
            letter.as_str(),
            AttemptType::Mcq,
        );
        (letter, attempt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::FeedbackRequest;
    use crate::mcq::McqResult;

    const TRANSCRIPT: &str = "This shows acute appendicitis with stranding around the appendix. \
No appendicolith seen. Recommend surgical consult.";

    fn case() -> Case {
        serde_json::from_str(
            r#"{"id":"gi-001","title":"RLQ pain","subspecialty":"Gastrointestinal Radiology",
                "boardPrompt":"CT of the abdomen in a patient with right lower quadrant pain.",
                "expectedAnswer":"Acute appendicitis with periappendiceal stranding.",
                "rubric":["acute appendicitis","periappendiceal stranding","appendicolith","surgical consult"]}"#,
        )
        .unwrap()
    }

    fn grader(mode: FeedbackMode) -> Grader {
        Grader {
            mode,
            ..Grader::default()
        }
    }

    fn reply(body: &'static str) -> impl Fn(&FeedbackRequest) -> Result<String> {
        move |_req: &FeedbackRequest| Ok(body.to_string())
    }

    const BLOCK_REPLY: &str = r#"{"feedback":"Good read.\nSCORE_DATA_START\nHITS: 4\nPARTIALS: 0\nMISSES: 0\nTOTAL: 4\nSIMILARITY: 0.95\nSCORE_DATA_END"}"#;

    #[test]
    fn test_heuristic_mode_never_calls_transport() {
        let called = std::cell::Cell::new(false);
        let transport = |_req: &FeedbackRequest| -> Result<String> {
            called.set(true);
            Ok(String::new())
        };
        let graded = grader(FeedbackMode::Heuristic).grade_case(&case(), TRANSCRIPT, Some(&transport));
        assert!(!called.get());
        assert_eq!(graded.source, ScoreSource::Heuristic);
        assert_eq!(graded.score.rubric_hit, 3);
        assert_eq!(graded.score.misses, vec!["appendicolith"]);
        assert!(!graded.feedback.contains(LLM_FEEDBACK_HEADER));
    }

    #[test]
    fn test_llm_mode_uses_normalized_score() {
        let transport = reply(BLOCK_REPLY);
        let graded = grader(FeedbackMode::Llm).grade_case(&case(), TRANSCRIPT, Some(&transport));
        assert_eq!(graded.source, ScoreSource::Llm);
        assert_eq!(graded.score.rubric_hit, 4);
        assert!((graded.score.similarity - 0.95).abs() < 1e-9);
        assert_eq!(graded.letter, Letter::A);
        assert!(graded.feedback.contains(LLM_FEEDBACK_HEADER));
        assert!(graded.feedback.contains("Good read."));
        assert!(!graded.feedback.contains("SCORE_DATA_START"));
        // Heuristic summary still leads the feedback
        assert!(graded.feedback.starts_with("Similarity to case focus"));
    }

    #[test]
    fn test_unparseable_reply_llm_zero_hybrid_fallback() {
        let transport = reply(r#"{"feedback":"Nice work overall."}"#);

        let llm = grader(FeedbackMode::Llm).grade_case(&case(), TRANSCRIPT, Some(&transport));
        assert_eq!(llm.score.similarity, 0.0);
        assert_eq!(llm.score.rubric_miss, 4);
        assert_eq!(llm.letter, Letter::F);

        let hybrid = grader(FeedbackMode::Hybrid).grade_case(&case(), TRANSCRIPT, Some(&transport));
        assert_eq!(hybrid.source, ScoreSource::Heuristic);
        assert_eq!(hybrid.score, hybrid.heuristic);
    }

    #[test]
    fn test_transport_error_keeps_heuristic() {
        let transport = |_req: &FeedbackRequest| -> Result<String> {
            Err(OralsError::Transport("LLM API error: 502 Bad Gateway".into()))
        };
        for mode in [FeedbackMode::Llm, FeedbackMode::Hybrid] {
            let graded = grader(mode).grade_case(&case(), TRANSCRIPT, Some(&transport));
            assert_eq!(graded.source, ScoreSource::Heuristic);
            assert_eq!(graded.score.rubric_hit, 3);
            assert!(graded
                .feedback
                .contains("— LLM error —\nLLM API error: 502 Bad Gateway"));
        }
    }

    #[test]
    fn test_missing_transport_is_reported() {
        let graded = grader(FeedbackMode::Hybrid).grade_case(&case(), TRANSCRIPT, None);
        assert!(graded
            .llm_error
            .as_deref()
            .unwrap()
            .contains("no feedback endpoint"));
    }

    #[test]
    fn test_attempt_from_graded() {
        let case = case();
        let graded = grader(FeedbackMode::Heuristic).grade_case(&case, TRANSCRIPT, None);
        let attempt = graded.to_attempt(&case);
        assert_eq!(attempt.case_id, "gi-001");
        assert_eq!(attempt.rubric_total, 4);
        assert_eq!(attempt.rubric_hit, 3);
        assert_eq!(attempt.kind, AttemptType::Oral);
        assert_eq!(attempt.letter, graded.letter.as_str());
    }

    #[test]
    fn test_mcq_attempt() {
        let result = McqResult {
            correct: 3,
            total: 4,
            questions: vec![],
        };
        let (letter, attempt) = grader(FeedbackMode::Heuristic).mcq_attempt(&case(), &result);
        assert_eq!(attempt.kind, AttemptType::Mcq);
        assert_eq!(attempt.rubric_hit, 3);
        assert!((attempt.similarity - 0.75).abs() < 1e-9);
        // 0.75 clears B on coverage; classic similarity needs > 0.75 for A
        assert_eq!(letter, Letter::B);
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!(FeedbackMode::parse("Hybrid").unwrap(), FeedbackMode::Hybrid);
        assert!(FeedbackMode::parse("oracle").is_err());
    }
}
