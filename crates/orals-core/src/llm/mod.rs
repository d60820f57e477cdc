//! Feedback-service integration: request payload, transport, response normalization

pub mod client;
pub mod normalize;
pub mod payload;

pub use client::{EndpointConfig, FeedbackTransport, HttpFeedbackClient};
pub use normalize::{normalize_response, normalize_text, normalize_value, Convention, Normalized};
pub use payload::{build_payload, FeedbackRequest, EXAMINER_INSTRUCTION};
