//! Request body sent to the feedback service

use serde::Serialize;

use crate::cases::Case;
use crate::score::ScoreResult;

/// Examiner instruction sent with every grading request
pub const EXAMINER_INSTRUCTION: &str = "\
You are an expert radiology oral-boards examiner.
Evaluate the trainee's transcript for this case.
1) Provide a concise summary of what they got right.
2) List specific gaps or incorrect statements.
3) Map their response to the rubric items (Hit/Partial/Miss) with one-line rationale each.
4) Give a 2-3 sentence coaching paragraph on how to improve.
Keep tone supportive, precise, and clinically grounded. Avoid hallucinations.
If the transcript is off-topic, say so and redirect to key imaging findings and next steps.
End with this block, one field per line, counts summing to the number of rubric items:
SCORE_DATA_START
HITS: <n>
PARTIALS: <n>
MISSES: <n>
TOTAL: <n>
SIMILARITY: <0.00-1.00>
SCORE_DATA_END";

/// Snake-case copy of the case inputs for prompt templating on the service side
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LlmInputs {
    pub case_summary: String,
    pub expected_answer: String,
    pub rubric: Vec<String>,
    pub trainee_transcript: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    pub case_id: String,
    pub title: String,
    pub subspecialty: String,
    pub board_prompt: String,
    pub expected_answer: String,
    pub rubric: Vec<String>,
    pub transcript: String,
    pub heuristic: ScoreResult,
    pub instruction: String,
    pub llm_inputs: LlmInputs,
}

pub fn build_payload(case: &Case, transcript: &str, heuristic: &ScoreResult) -> FeedbackRequest {
    FeedbackRequest {
        case_id: case.id.clone(),
        title: case.title.clone(),
        subspecialty: case.subspecialty.clone(),
        board_prompt: case.prompt().to_string(),
        expected_answer: case.expected().to_string(),
        rubric: case.rubric.clone(),
        transcript: transcript.to_string(),
        heuristic: heuristic.clone(),
        instruction: EXAMINER_INSTRUCTION.to_string(),
        llm_inputs: LlmInputs {
            case_summary: case.prompt().to_string(),
            expected_answer: case.expected().to_string(),
            rubric: case.rubric.clone(),
            trainee_transcript: transcript.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristic::{grade_heuristic, HeuristicInput};

    #[test]
    fn test_payload_shape() {
        let case: Case = serde_json::from_str(
            r#"{"id":"gi-001","title":"RLQ pain","subspecialty":"Gastrointestinal Radiology",
                "boardPrompt":"CT abdomen.","expectedAnswer":"Acute appendicitis",
                "rubric":["acute appendicitis","appendicolith"]}"#,
        )
        .unwrap();
        let transcript = "Acute appendicitis.";
        let heuristic = grade_heuristic(&HeuristicInput {
            transcript,
            prompt: case.prompt(),
            expected: case.expected(),
            rubric: &case.rubric,
        });

        let json = serde_json::to_value(build_payload(&case, transcript, &heuristic)).unwrap();
        assert_eq!(json["caseId"], "gi-001");
        assert_eq!(json["boardPrompt"], "CT abdomen.");
        assert_eq!(json["rubric"].as_array().unwrap().len(), 2);
        assert_eq!(json["heuristic"]["rubricHit"], 1);
        assert_eq!(json["llmInputs"]["trainee_transcript"], transcript);
        assert!(json["instruction"]
            .as_str()
            .unwrap()
            .contains("SCORE_DATA_START"));
    }

    #[test]
    fn test_missing_case_text_becomes_empty() {
        let case: Case = serde_json::from_str(r#"{"id":"x"}"#).unwrap();
        let payload = build_payload(&case, "", &ScoreResult::zero(&[]));
        assert_eq!(payload.board_prompt, "");
        assert_eq!(payload.expected_answer, "");
        assert!(payload.rubric.is_empty());
    }
}
