use serde::{Deserialize, Serialize};

/// One entry in a chat-completion message list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Audio payload for the transcription endpoint.
#[derive(Debug, Clone)]
pub struct TranscriptionRequest {
    pub audio: Vec<u8>,
    /// Original filename; the endpoint sniffs the container format from it.
    pub filename: String,
    pub language: Option<String>,
    pub prompt: Option<String>,
}

/// Why a provider call failed. RateLimited is the one variant worth
/// retrying; everything else surfaces immediately.
#[derive(Debug, thiserror::Error)]
pub enum OpenAiError {
    #[error("invalid API credential")]
    InvalidCredential,
    #[error("quota exceeded")]
    QuotaExceeded,
    #[error("rate limited")]
    RateLimited,
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("unexpected response shape: {0}")]
    BadResponse(String),
}

impl OpenAiError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, OpenAiError::RateLimited)
    }
}
