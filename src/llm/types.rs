//! Model gateway wire types and errors.

use serde::{Deserialize, Serialize};

// =============================================================================
// ERRORS
// =============================================================================

/// Failure of a single model call. Calls are never retried.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// DNS failure, refused connection or unreachable host.
    #[error("model gateway unreachable: {0}")]
    NetworkUnreachable(String),

    /// The request did not complete within the configured timeout.
    #[error("model gateway timed out")]
    Timeout,

    /// The gateway answered with a non-success status.
    #[error("model gateway error {status}: {message}")]
    UpstreamError { status: u16, message: String },

    /// The request was sent but no complete response came back.
    #[error("no response from model gateway: {0}")]
    NoResponse(String),

    /// The first completion choice carried no usable text.
    #[error("model returned an empty response")]
    EmptyResponse,

    #[error("model call failed: {0}")]
    Unknown(String),
}

impl crate::error::ErrorCode for ModelError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NetworkUnreachable(_) => "E_MODEL_UNREACHABLE",
            Self::Timeout => "E_MODEL_TIMEOUT",
            Self::UpstreamError { .. } => "E_MODEL_UPSTREAM",
            Self::NoResponse(_) => "E_MODEL_NO_RESPONSE",
            Self::EmptyResponse => "E_MODEL_EMPTY_RESPONSE",
            Self::Unknown(_) => "E_MODEL_UNKNOWN",
        }
    }

    fn retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkUnreachable(_)
                | Self::Timeout
                | Self::NoResponse(_)
                | Self::UpstreamError { status: 429 | 500..=599, .. }
        )
    }
}

/// Errors raised while constructing the model client.
#[derive(Debug, thiserror::Error)]
pub enum LlmInitError {
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

// =============================================================================
// REQUEST
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// JSON body posted to `/chat/completions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRequestBody {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

// =============================================================================
// RESPONSE
// =============================================================================

/// Text and metadata extracted from a completion response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub finish_reason: Option<String>,
    pub model: String,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

impl Completion {
    /// `true` when the model stopped because it hit the token limit.
    #[must_use]
    pub fn truncated(&self) -> bool {
        self.finish_reason.as_deref() == Some("length")
    }
}
