//! Persisted attempt log and the statistics derived from it
//!
//! The log is a single JSON document `{"attempts": [...]}`. Every write is a
//! plain read-modify-write of the whole file with no locking: two processes
//! recording at once race, and the last writer wins.

mod stats;

pub use stats::{
    daily_trend, get_stats, grade_distribution, lowest_scores, progress_report, ProficiencyBand,
    ProgressReport, Stats, SubspecialtyScore, SubspecialtyStats, Summary, TimeRange, TrendPoint,
};

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{OralsError, Result};

/// File name of the attempt log inside the data directory
pub const PROGRESS_FILE: &str = "progress_v1.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptType {
    #[default]
    Oral,
    Mcq,
}

impl AttemptType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptType::Oral => "oral",
            AttemptType::Mcq => "mcq",
        }
    }
}

/// One graded submission; never updated once written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
    /// Milliseconds since the Unix epoch
    pub ts: i64,
    pub case_id: String,
    #[serde(default)]
    pub subspecialty: String,
    #[serde(default)]
    pub similarity: f64,
    #[serde(default)]
    pub rubric_hit: usize,
    #[serde(default)]
    pub rubric_total: usize,
    #[serde(default)]
    pub letter: String,
    #[serde(rename = "type", default)]
    pub kind: AttemptType,
}

impl Attempt {
    /// A new attempt stamped with the current time
    pub fn now(
        case_id: impl Into<String>,
        subspecialty: impl Into<String>,
        similarity: f64,
        rubric_hit: usize,
        rubric_total: usize,
        letter: impl Into<String>,
        kind: AttemptType,
    ) -> Self {
        Attempt {
            ts: Utc::now().timestamp_millis(),
            case_id: case_id.into(),
            subspecialty: subspecialty.into(),
            similarity,
            rubric_hit,
            rubric_total,
            letter: letter.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressLog {
    #[serde(default)]
    pub attempts: Vec<Attempt>,
}

/// File-backed attempt log
#[derive(Debug, Clone)]
pub struct ProgressStore {
    path: PathBuf,
}

impl ProgressStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ProgressStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the log; a missing file is empty, a corrupt one is logged and treated as empty
    pub fn load(&self) -> Result<ProgressLog> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ProgressLog::default()),
            Err(e) => return Err(OralsError::io_operation("read", self.path.display(), e)),
        };
        if content.trim().is_empty() {
            return Ok(ProgressLog::default());
        }
        match serde_json::from_str(&content) {
            Ok(log) => Ok(log),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Corrupt progress file, starting empty");
                Ok(ProgressLog::default())
            }
        }
    }

    fn save(&self, log: &ProgressLog) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| OralsError::io_operation("create directory", parent.display(), e))?;
        }
        let json = serde_json::to_string_pretty(log)?;
        fs::write(&self.path, json)
            .map_err(|e| OralsError::io_operation("write", self.path.display(), e))
    }

    /// Append one attempt (no dedup, no update in place)
    #[tracing::instrument(skip(self, attempt), fields(case_id = %attempt.case_id))]
    pub fn record(&self, attempt: Attempt) -> Result<()> {
        let mut log = self.load()?;
        debug!(
            kind = attempt.kind.as_str(),
            similarity = attempt.similarity,
            "record_attempt"
        );
        log.attempts.push(attempt);
        self.save(&log)
    }

    pub fn attempts(&self) -> Result<Vec<Attempt>> {
        Ok(self.load()?.attempts)
    }

    /// Drop every attempt, returning how many were removed
    pub fn reset(&self) -> Result<usize> {
        let removed = self.load()?.attempts.len();
        self.save(&ProgressLog::default())?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests;
