//! Multiple-choice questions attached to a case

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::bail_invalid;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct McqSet {
    #[serde(default)]
    pub questions: Vec<McqQuestion>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub shuffle_questions: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McqQuestion {
    #[serde(default)]
    pub id: String,
    pub stem: String,
    #[serde(default)]
    pub choices: Vec<McqChoice>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub multi_select: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub shuffle_choices: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McqChoice {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub correct: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explain: Option<String>,
}

impl McqQuestion {
    /// Id used to address the question: explicit id, else its 1-based position
    pub fn key(&self, index: usize) -> String {
        if self.id.is_empty() {
            (index + 1).to_string()
        } else {
            self.id.clone()
        }
    }

    /// More than one answer may be selected
    pub fn is_multi(&self) -> bool {
        self.multi_select || self.correct_ids().len() > 1
    }

    pub fn correct_ids(&self) -> BTreeSet<&str> {
        self.choices
            .iter()
            .filter(|c| c.correct)
            .map(|c| c.id.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChoiceOutcome {
    /// Selected and correct
    Correct,
    /// Selected but not correct
    Wrong,
    /// Correct but not selected
    Missed,
    /// Neither selected nor correct
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoiceResult {
    pub id: String,
    pub text: String,
    pub outcome: ChoiceOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionResult {
    pub id: String,
    pub stem: String,
    pub correct: bool,
    pub choices: Vec<ChoiceResult>,
    /// "text: explanation" for every selected or correct choice that has one
    pub explanations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct McqResult {
    pub correct: usize,
    pub total: usize,
    pub questions: Vec<QuestionResult>,
}

impl McqResult {
    /// Fraction of questions answered exactly right; 0 when there are none
    pub fn similarity(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }
}

/// Parse `q1=a,c` style answers into question key to selected choice ids
pub fn parse_answers<S: AsRef<str>>(specs: &[S]) -> Result<HashMap<String, BTreeSet<String>>> {
    let mut answers: HashMap<String, BTreeSet<String>> = HashMap::new();
    for spec in specs {
        let spec = spec.as_ref();
        let Some((question, choices)) = spec.split_once('=') else {
            bail_invalid!("answer (expected QID=CHOICE[,CHOICE])", spec);
        };
        let question = question.trim();
        if question.is_empty() {
            bail_invalid!("answer (missing question id)", spec);
        }
        answers.entry(question.to_string()).or_default().extend(
            choices
                .split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
        );
    }
    Ok(answers)
}

/// Grade selected answers; a question is right only when the selection equals the correct set
pub fn grade_mcq(set: &McqSet, answers: &HashMap<String, BTreeSet<String>>) -> McqResult {
    let empty = BTreeSet::new();
    let questions: Vec<QuestionResult> = set
        .questions
        .iter()
        .enumerate()
        .map(|(index, q)| {
            let key = q.key(index);
            let selected = answers.get(&key).unwrap_or(&empty);
            let correct_ids = q.correct_ids();
            let all_right = selected.len() == correct_ids.len()
                && selected.iter().all(|s| correct_ids.contains(s.as_str()));

            let choices = q
                .choices
                .iter()
                .map(|c| {
                    let is_sel = selected.contains(&c.id);
                    let outcome = match (is_sel, c.correct) {
                        (true, true) => ChoiceOutcome::Correct,
                        (true, false) => ChoiceOutcome::Wrong,
                        (false, true) => ChoiceOutcome::Missed,
                        (false, false) => ChoiceOutcome::Neutral,
                    };
                    ChoiceResult {
                        id: c.id.clone(),
                        text: c.text.clone(),
                        outcome,
                    }
                })
                .collect();

            let explanations = q
                .choices
                .iter()
                .filter(|c| c.correct || selected.contains(&c.id))
                .filter_map(|c| c.explain.as_ref().map(|e| format!("{}: {}", c.text, e)))
                .collect();

            QuestionResult {
                id: key,
                stem: q.stem.clone(),
                correct: all_right,
                choices,
                explanations,
            }
        })
        .collect();

    McqResult {
        correct: questions.iter().filter(|q| q.correct).count(),
        total: questions.len(),
        questions,
    }
}
