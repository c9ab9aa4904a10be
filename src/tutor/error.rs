//! Error types for the tutor API

use thiserror::Error;

/// Errors that can occur when talking to the tutor endpoint
#[derive(Debug, Error)]
pub enum TutorError {
    /// No endpoint configured
    #[error("Tutor endpoint not configured. Set tutor.endpoint in config.json or STUDYHUB_TUTOR_ENDPOINT")]
    NotConfigured,

    /// Prompt was empty after trimming
    #[error("Prompt cannot be empty")]
    EmptyPrompt,

    /// Failed to access system keyring
    #[error("Failed to access keyring: {0}")]
    KeyringError(String),

    /// Invalid API key format
    #[error("Invalid API key format. Keys must be at least 20 characters without whitespace")]
    InvalidApiKey,

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// The call did not finish within the configured bound
    #[error("Tutor did not answer within {seconds} seconds")]
    Timeout {
        /// Configured bound
        seconds: u64,
    },

    /// API returned an error response
    #[error("API error ({status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from API
        message: String,
    },

    /// Rate limited by the API
    #[error("Rate limited. Retry after {retry_after_seconds} seconds")]
    RateLimited {
        /// Seconds to wait before retrying
        retry_after_seconds: u64,
    },

    /// The hosted model is still warming up
    #[error("Model is loading (about {estimated_seconds} seconds)")]
    ModelLoading {
        /// Server estimate of the remaining load time
        estimated_seconds: u64,
    },

    /// Successful response without any text
    #[error("The tutor returned an empty response")]
    EmptyResponse,

    /// Failed to parse streaming response
    #[error("Stream parsing error: {0}")]
    StreamParseError(String),

    /// Request was cancelled by user
    #[error("Request cancelled")]
    Cancelled,

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl TutorError {
    /// Check if this error is recoverable (user can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TutorError::RateLimited { .. }
                | TutorError::ModelLoading { .. }
                | TutorError::RequestError(_)
                | TutorError::Timeout { .. }
                | TutorError::Cancelled
        )
    }

    /// Check if a fallback model is worth trying
    pub fn is_busy(&self) -> bool {
        matches!(self, TutorError::RateLimited { .. } | TutorError::ModelLoading { .. })
    }

    /// Check if this error requires re-authentication
    pub fn requires_reauth(&self) -> bool {
        matches!(
            self,
            TutorError::InvalidApiKey
                | TutorError::ApiError { status: 401, .. }
                | TutorError::ApiError { status: 403, .. }
        )
    }

    /// User-facing placeholder shown instead of an answer
    pub fn placeholder(&self) -> String {
        match self {
            TutorError::NotConfigured => {
                "The AI tutor is not set up yet. Configure a tutor endpoint to ask questions."
                    .to_string()
            }
            TutorError::EmptyPrompt => "Type a question for the tutor first.".to_string(),
            TutorError::ModelLoading { estimated_seconds } => format!(
                "The tutor model is warming up. Please try again in about {} seconds.",
                (*estimated_seconds).max(5)
            ),
            TutorError::RateLimited { .. } => {
                "The tutor is busy right now. Please wait a moment and try again.".to_string()
            }
            TutorError::Cancelled => "Request cancelled.".to_string(),
            e if e.requires_reauth() => {
                "The tutor rejected the API key. Update it with `studyhub key set`.".to_string()
            }
            _ => "The tutor is unavailable right now. Please try again in a moment.".to_string(),
        }
    }
}
