//! Case model and the case library

mod library;

pub use library::{CaseFilter, CaseLibrary};

use serde::{Deserialize, Serialize};

use crate::mcq::McqSet;

/// Subspecialties a case may belong to, in display order
pub const SUBSPECIALTIES: [&str; 10] = [
    "Neuroradiology",
    "Musculoskeletal Radiology",
    "Gastrointestinal Radiology",
    "Genitourinary Radiology",
    "Ultrasound",
    "Pediatric Radiology",
    "Breast Imaging",
    "Vascular & Interventional Radiology",
    "Thoracic Radiology",
    "Physics",
];

/// One practice case. Read-only from the grader's point of view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Case {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subspecialty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_answer: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rubric: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcqs: Option<McqSet>,
}

impl Case {
    pub fn prompt(&self) -> &str {
        self.board_prompt.as_deref().unwrap_or_default()
    }

    pub fn expected(&self) -> &str {
        self.expected_answer.as_deref().unwrap_or_default()
    }

    pub fn has_mcqs(&self) -> bool {
        self.mcqs.as_ref().is_some_and(|m| !m.questions.is_empty())
    }

    /// Copy without the answer key, for exam mode
    pub fn redacted(&self) -> Case {
        Case {
            expected_answer: None,
            rubric: Vec::new(),
            ..self.clone()
        }
    }

    /// Text searched by the free-text filter
    fn haystack(&self) -> String {
        [
            self.title.as_str(),
            self.prompt(),
            self.expected(),
            &self.tags.join(" "),
            self.subspecialty.as_str(),
        ]
        .join(" ")
        .to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_deserializes_with_defaults() {
        let case: Case = serde_json::from_str(
            r#"{"id":"gi-001","title":"RLQ pain","subspecialty":"Gastrointestinal Radiology"}"#,
        )
        .unwrap();
        assert_eq!(case.prompt(), "");
        assert!(case.rubric.is_empty());
        assert!(!case.has_mcqs());
    }

    #[test]
    fn test_redacted_drops_answer_key() {
        let case = Case {
            id: "gi-001".into(),
            title: "RLQ pain".into(),
            subspecialty: "Gastrointestinal Radiology".into(),
            board_prompt: Some("CT shown.".into()),
            expected_answer: Some("Appendicitis".into()),
            rubric: vec!["acute appendicitis".into()],
            tags: vec![],
            images: vec![],
            mcqs: None,
        };
        let redacted = case.redacted();
        assert_eq!(redacted.expected_answer, None);
        assert!(redacted.rubric.is_empty());
        assert_eq!(redacted.board_prompt, case.board_prompt);

        let json = serde_json::to_value(&redacted).unwrap();
        assert!(json.get("expectedAnswer").is_none());
        assert!(json.get("rubric").is_none());
    }
}
