//! Error types and exit codes for orals
//!
//! Exit codes:
//! - 0: Success
//! - 1: Generic failure
//! - 2: Usage error (bad flags/args)
//! - 3: Data error (missing case, unreadable case library or progress store)
//!
//! The grading pipeline itself is total: malformed LLM output, transport
//! failures and empty input degrade into diagnostics inside the graded
//! result instead of surfacing here.

mod macros;

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the orals CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success (0)
    Success = 0,
    /// Generic failure (1)
    Failure = 1,
    /// Usage error - bad flags/args (2)
    Usage = 2,
    /// Data error - missing case, invalid case file (3)
    Data = 3,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

/// Errors that can occur during orals operations
#[derive(Error, Debug)]
pub enum OralsError {
    // Usage errors (exit code 2)
    #[error("unknown format: {0} (expected: human, json, or records)")]
    UnknownFormat(String),

    #[error("{0}")]
    UsageError(String),

    #[error("invalid {context}: {value}")]
    InvalidValue { context: String, value: String },

    #[error("unsupported {context}: {value} (supported: {supported})")]
    Unsupported {
        context: String,
        value: String,
        supported: String,
    },

    // Data errors (exit code 3)
    #[error("case not found: {id}")]
    CaseNotFound { id: String },

    #[error("invalid case library {path:?}: {reason}")]
    InvalidCaseLibrary { path: PathBuf, reason: String },

    #[error("{context} not found: {value}")]
    NotFound { context: String, value: String },

    // Generic failures (exit code 1)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("feedback service error: {0}")]
    Transport(String),

    #[error("failed to {operation} {target}: {reason}")]
    FailedOperationWithTarget {
        operation: String,
        target: String,
        reason: String,
    },

    #[error("{0}")]
    Other(String),
}

impl OralsError {
    /// Create an error for a failed IO operation with context
    pub fn io_operation(
        operation: &str,
        path: impl std::fmt::Display,
        error: impl std::fmt::Display,
    ) -> Self {
        OralsError::FailedOperationWithTarget {
            operation: operation.to_string(),
            target: path.to_string(),
            reason: error.to_string(),
        }
    }

    /// Create an error for an invalid value or configuration
    pub fn invalid_value(context: &str, value: impl std::fmt::Display) -> Self {
        OralsError::InvalidValue {
            context: context.to_string(),
            value: value.to_string(),
        }
    }

    /// Create an error for an entity that was not found
    pub fn not_found(context: &str, value: impl std::fmt::Display) -> Self {
        OralsError::NotFound {
            context: context.to_string(),
            value: value.to_string(),
        }
    }

    /// Create an error for an unsupported value
    pub fn unsupported(
        context: &str,
        value: impl std::fmt::Display,
        supported: impl std::fmt::Display,
    ) -> Self {
        OralsError::Unsupported {
            context: context.to_string(),
            value: value.to_string(),
            supported: supported.to_string(),
        }
    }

    /// Get the appropriate exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            OralsError::UnknownFormat(_)
            | OralsError::UsageError(_)
            | OralsError::InvalidValue { .. }
            | OralsError::Unsupported { .. } => ExitCode::Usage,

            OralsError::CaseNotFound { .. }
            | OralsError::InvalidCaseLibrary { .. }
            | OralsError::NotFound { .. } => ExitCode::Data,

            OralsError::Io(_)
            | OralsError::Json(_)
            | OralsError::Toml(_)
            | OralsError::Transport(_)
            | OralsError::FailedOperationWithTarget { .. }
            | OralsError::Other(_) => ExitCode::Failure,
        }
    }

    /// Get the error type identifier
    fn error_type(&self) -> &'static str {
        match self {
            OralsError::UnknownFormat(_) => "unknown_format",
            OralsError::UsageError(_) => "usage_error",
            OralsError::InvalidValue { .. } => "invalid_value",
            OralsError::Unsupported { .. } => "unsupported",
            OralsError::CaseNotFound { .. } => "case_not_found",
            OralsError::InvalidCaseLibrary { .. } => "invalid_case_library",
            OralsError::NotFound { .. } => "not_found",
            OralsError::Io(_) => "io_error",
            OralsError::Json(_) => "json_error",
            OralsError::Toml(_) => "toml_error",
            OralsError::Transport(_) => "transport_error",
            OralsError::FailedOperationWithTarget { .. } => "failed_operation_with_target",
            OralsError::Other(_) => "other",
        }
    }

    /// Convert error to JSON representation for structured error output.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "code": self.exit_code() as i32,
                "type": self.error_type(),
                "message": self.to_string(),
            }
        })
    }
}

/// Result type alias for orals operations
pub type Result<T> = std::result::Result<T, OralsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_by_group() {
        assert_eq!(
            OralsError::UsageError("bad".into()).exit_code(),
            ExitCode::Usage
        );
        assert_eq!(
            OralsError::CaseNotFound { id: "gi-001".into() }.exit_code(),
            ExitCode::Data
        );
        assert_eq!(
            OralsError::Transport("refused".into()).exit_code(),
            ExitCode::Failure
        );
    }

    #[test]
    fn test_to_json_envelope() {
        let err = OralsError::CaseNotFound { id: "gi-001".into() };
        let json = err.to_json();
        assert_eq!(json["error"]["code"], 3);
        assert_eq!(json["error"]["type"], "case_not_found");
        assert_eq!(json["error"]["message"], "case not found: gi-001");
    }

    #[test]
    fn test_helper_constructors() {
        let err = OralsError::invalid_value("similarity", "1.7");
        assert_eq!(err.to_string(), "invalid similarity: 1.7");

        let err = OralsError::unsupported("preset", "lenient", "classic, aligned");
        assert_eq!(
            err.to_string(),
            "unsupported preset: lenient (supported: classic, aligned)"
        );
    }
}
