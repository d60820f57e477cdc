//! Transport to the feedback service
//!
//! One POST per grading request, no retry. Every failure comes back as
//! [`OralsError::Transport`] carrying the text shown to the trainee.

use std::time::Duration;

use tracing::{debug, warn};

use super::payload::FeedbackRequest;
use crate::error::{OralsError, Result};

/// Longest slice of an error body quoted back in a diagnostic
const BODY_EXCERPT_CHARS: usize = 200;

/// Something that can answer a feedback request with a raw response body
pub trait FeedbackTransport {
    fn send(&self, request: &FeedbackRequest) -> Result<String>;
}

impl<F> FeedbackTransport for F
where
    F: Fn(&FeedbackRequest) -> Result<String>,
{
    fn send(&self, request: &FeedbackRequest) -> Result<String> {
        self(request)
    }
}

/// Where and how to reach the feedback service
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EndpointConfig {
    pub url: String,
    /// Sent as `x-api-key` when present
    pub api_key: Option<String>,
    /// No timeout unless configured
    pub timeout: Option<Duration>,
}

impl EndpointConfig {
    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty()
    }
}

pub struct HttpFeedbackClient {
    config: EndpointConfig,
    agent: ureq::Agent,
    user_agent: String,
}

impl HttpFeedbackClient {
    pub fn new(config: EndpointConfig) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(config.timeout)
            .build()
            .into();
        let user_agent = format!(
            "orals/{} ({})",
            env!("CARGO_PKG_VERSION"),
            std::env::consts::OS
        );
        HttpFeedbackClient {
            config,
            agent,
            user_agent,
        }
    }

    pub fn config(&self) -> &EndpointConfig {
        &self.config
    }
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(BODY_EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}…", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

/// Diagnostic for a non-2xx reply
pub fn api_error(status: u16, body: &str) -> OralsError {
    let excerpt = excerpt(body);
    if excerpt.is_empty() {
        OralsError::Transport(format!("LLM API error: {status}"))
    } else {
        OralsError::Transport(format!("LLM API error: {status} {excerpt}"))
    }
}

impl FeedbackTransport for HttpFeedbackClient {
    #[tracing::instrument(skip(self, request), fields(case_id = %request.case_id))]
    fn send(&self, request: &FeedbackRequest) -> Result<String> {
        if !self.config.is_configured() {
            return Err(OralsError::Transport(
                "LLM transport error: no feedback endpoint configured".to_string(),
            ));
        }

        let json_payload = serde_json::to_string(request)?;

        let mut call = self
            .agent
            .post(&self.config.url)
            .header("Content-Type", "application/json")
            .header("User-Agent", &self.user_agent);
        if let Some(key) = self.config.api_key.as_deref().filter(|k| !k.is_empty()) {
            call = call.header("x-api-key", key);
        }

        let mut response = call.send(json_payload.as_str()).map_err(|e| {
            warn!(error = %e, "feedback request failed");
            OralsError::Transport(format!("LLM transport error: {e}"))
        })?;

        let status = response.status();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| OralsError::Transport(format!("LLM transport error: {e}")))?;
        debug!(status = status.as_u16(), bytes = body.len(), "feedback response");

        if status.is_success() {
            Ok(body)
        } else {
            warn!(status = status.as_u16(), "feedback service returned an error");
            Err(api_error(status.as_u16(), &body))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cases::Case;
    use crate::llm::build_payload;
    use crate::score::ScoreResult;

    fn request() -> FeedbackRequest {
        let case: Case = serde_json::from_str(r#"{"id":"gi-001"}"#).unwrap();
        build_payload(&case, "text", &ScoreResult::zero(&[]))
    }

    #[test]
    fn test_closure_transport() {
        let transport =
            |req: &FeedbackRequest| -> Result<String> { Ok(format!("echo {}", req.case_id)) };
        assert_eq!(transport.send(&request()).unwrap(), "echo gi-001");
    }

    #[test]
    fn test_unconfigured_endpoint_is_transport_error() {
        let client = HttpFeedbackClient::new(EndpointConfig::default());
        let err = client.send(&request()).unwrap_err();
        assert!(err.to_string().contains("LLM transport error"));
    }

    #[test]
    fn test_api_error_excerpt() {
        assert_eq!(
            api_error(503, "  Service Unavailable \n").to_string(),
            "feedback service error: LLM API error: 503 Service Unavailable"
        );
        assert_eq!(
            api_error(500, "").to_string(),
            "feedback service error: LLM API error: 500"
        );
        let long = "x".repeat(500);
        let msg = api_error(502, &long).to_string();
        assert!(msg.ends_with('…'));
        assert!(msg.len() < 300);
    }
}
