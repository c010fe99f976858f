//! Chat-service failures

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LLMError>;

#[derive(Error, Debug)]
pub enum LLMError {
    /// Non-success status without a more specific mapping
    #[error("Chat request failed: {0}")]
    RequestFailed(String),

    /// HTTP 401 or 403
    #[error("Chat service rejected the API key")]
    AuthenticationFailed,

    /// HTTP 429, with the service's explanation
    #[error("Chat service rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    #[error("Chat request timed out after {0}s")]
    Timeout(u64),

    /// HTTP 400
    #[error("Invalid chat request: {0}")]
    InvalidRequest(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[cfg(feature = "openai")]
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The body did not look like a chat-completions reply
    #[error("Unexpected chat response: {0}")]
    UnexpectedResponse(String),

    #[error("Chat provider misconfigured: {0}")]
    ConfigurationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(LLMError::Timeout(30).to_string(), "Chat request timed out after 30s");
        assert_eq!(
            LLMError::AuthenticationFailed.to_string(),
            "Chat service rejected the API key"
        );
        assert_eq!(
            LLMError::ModelNotFound("gpt-4".to_string()).to_string(),
            "Model not found: gpt-4"
        );
    }
}
