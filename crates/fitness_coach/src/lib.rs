//! Nutrition targets and a keyword-gated AI fitness coach.
//!
//! The crate has two halves. The deterministic half turns body metrics into
//! calorie and macro ranges ([`metrics`], [`units`], [`profile`]). The
//! conversational half decides whether a question is about fitness
//! ([`classifier`]), renders a prompt ([`prompt`]) and forwards it to a
//! [`GenerativeClient`] such as the Gemini-backed
//! [`http_client::ReqwestGeminiClient`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod canned;
pub mod classifier;
pub mod coach;
pub mod config;
pub mod http_client;
pub mod metrics;
pub mod preferences;
pub mod profile;
pub mod profile_store;
pub mod prompt;
pub mod session;
pub mod units;

pub use classifier::{FitnessType, QueryClass};
pub use coach::{Coach, CoachReply, CoachRequest};
pub use metrics::{MetricsResult, Range};
pub use profile::{ActivityLevel, Goal, Sex, UserDetails, UserProfile};
pub use prompt::{GenerationConfig, PromptRequest};

/// Details sent back when the upstream service throttles us.
pub const RATE_LIMIT_DETAILS: &str =
    "The AI service is temporarily busy. Please wait a moment and try again.";

const TIMEOUT_DETAILS: &str = "The request timed out. Please try again.";

#[derive(Debug, Error)]
pub enum CoachError {
    #[error("http error: {0}")]
    Http(reqwest::Error),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("Rate limit exceeded")]
    RateLimited,
    #[error("upstream service unavailable ({status})")]
    ServiceUnavailable { status: u16, body: String },
    #[error("upstream request failed ({status})")]
    Upstream { status: u16, body: String },
    #[error("No response generated")]
    NoResponse,
    #[error("Request timeout")]
    Timeout,
    #[error("decoding upstream response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for CoachError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CoachError::Timeout
        } else {
            CoachError::Http(err)
        }
    }
}

impl CoachError {
    /// Classify a non-2xx upstream response.
    ///
    /// Throttling wins over the status class: a 503 whose body mentions a
    /// quota is still reported as a rate limit.
    pub fn from_status(status: u16, body: String) -> Self {
        if status == 429 || body.contains("rate-limited") || body.contains("quota") {
            CoachError::RateLimited
        } else if status >= 500 {
            CoachError::ServiceUnavailable { status, body }
        } else {
            CoachError::Upstream { status, body }
        }
    }

    /// HTTP status the caller should see for this failure.
    pub fn status(&self) -> u16 {
        match self {
            CoachError::RateLimited => 429,
            CoachError::Timeout => 408,
            CoachError::ServiceUnavailable { status, .. } | CoachError::Upstream { status, .. } => {
                *status
            }
            CoachError::Http(_)
            | CoachError::Config(_)
            | CoachError::NoResponse
            | CoachError::Decode(_) => 500,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, CoachError::RateLimited)
    }

    /// Short label used for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            CoachError::Http(_) => "http",
            CoachError::Config(_) => "config",
            CoachError::RateLimited => "rate_limited",
            CoachError::ServiceUnavailable { .. } => "service_unavailable",
            CoachError::Upstream { .. } => "upstream",
            CoachError::NoResponse => "no_response",
            CoachError::Timeout => "timeout",
            CoachError::Decode(_) => "decode",
        }
    }

    /// Render the JSON error body returned to callers.
    pub fn to_body(&self) -> ErrorBody {
        match self {
            CoachError::RateLimited => ErrorBody {
                error: "Rate limit exceeded".into(),
                details: Some(RATE_LIMIT_DETAILS.into()),
                status: Some(429),
            },
            CoachError::ServiceUnavailable { status, body }
            | CoachError::Upstream { status, body } => ErrorBody {
                error: "Failed to generate response".into(),
                details: Some(body.clone()),
                status: Some(*status),
            },
            CoachError::NoResponse => ErrorBody {
                error: "No response generated".into(),
                details: None,
                status: None,
            },
            CoachError::Timeout => ErrorBody {
                error: "Request timeout".into(),
                details: Some(TIMEOUT_DETAILS.into()),
                status: None,
            },
            CoachError::Http(_) | CoachError::Config(_) | CoachError::Decode(_) => ErrorBody {
                error: "Internal server error".into(),
                details: Some(self.to_string()),
                status: None,
            },
        }
    }
}

/// Error payload shared by every failing coach endpoint.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

/// A text-generation backend. One call per user query, no retries.
#[async_trait]
pub trait GenerativeClient: Send + Sync + 'static {
    async fn generate(&self, request: &PromptRequest) -> Result<String, CoachError>;
}
