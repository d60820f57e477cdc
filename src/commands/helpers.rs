//! Shared helpers for command implementations

use std::io::Read;
use std::path::Path;

use chrono::DateTime;

use crate::cli::TranscriptArgs;
use orals_core::config::GraderConfig;
use orals_core::error::{OralsError, Result};
use orals_core::llm::HttpFeedbackClient;

/// Read a file, or stdin when the path is `-`
pub fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| OralsError::io_operation("read", "stdin", e))?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).map_err(|e| OralsError::io_operation("read", path.display(), e))
}

/// Transcript from `--transcript`, `--transcript-file`, or stdin
pub fn read_transcript(args: &TranscriptArgs) -> Result<String> {
    if let Some(text) = &args.transcript {
        return Ok(text.clone());
    }
    match &args.transcript_file {
        Some(path) => read_input(path),
        None => read_input(Path::new("-")),
    }
}

/// HTTP client when a feedback endpoint is configured
pub fn feedback_client(config: &GraderConfig) -> Option<HttpFeedbackClient> {
    let endpoint = config.llm.endpoint_config();
    endpoint
        .is_configured()
        .then(|| HttpFeedbackClient::new(endpoint))
}

/// Fraction as a rounded percentage
pub fn pct(fraction: f64) -> i64 {
    (fraction * 100.0).round() as i64
}

/// Millisecond timestamp as RFC 3339 (UTC)
pub fn format_ts(ts_ms: i64) -> String {
    DateTime::from_timestamp_millis(ts_ms)
        .map(|d| d.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
        .unwrap_or_else(|| ts_ms.to_string())
}
