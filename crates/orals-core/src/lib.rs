//! Orals Core Library
//!
//! Grading engine for radiology oral-boards practice: concept detection,
//! heuristic rubric scoring, LLM feedback normalization, letter grades, and
//! the local attempt log.

pub mod cases;
pub mod concepts;
pub mod config;
pub mod error;
pub mod format;
pub mod grade;
pub mod heuristic;
pub mod llm;
pub mod logging;
pub mod mcq;
pub mod progress;
pub mod rubric;
pub mod score;
pub mod session;
pub mod text;
