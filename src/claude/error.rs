//! Error types for Claude API integration

use thiserror::Error;

/// Errors that can occur when interacting with the Claude API
#[derive(Debug, Error)]
pub enum ClaudeError {
    /// API key is not configured
    #[error("API key not configured. Run `tubequiz key set <KEY>` or set ANTHROPIC_API_KEY")]
    ApiKeyNotFound,

    /// Failed to access system keyring
    #[error("Failed to access keyring: {0}")]
    KeyringError(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

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

    /// Response carried no text content
    #[error("Claude returned an empty response")]
    EmptyResponse,

    /// Invalid API key format
    #[error("Invalid API key format. Key should start with 'sk-ant-'")]
    InvalidApiKey,

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}
