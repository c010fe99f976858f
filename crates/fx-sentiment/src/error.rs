//! Error types for the sentiment pipeline

use fx_llm::LLMError;
use thiserror::Error;

/// Sentiment pipeline errors
#[derive(Debug, Error)]
pub enum SentimentError {
    /// Missing or invalid configuration (e.g. an absent API key)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Provider throttled the request (HTTP 429)
    #[error("Rate limit exceeded for {provider}")]
    RateLimitExceeded { provider: String },

    /// Connection could not be established or was dropped
    #[error("Network error: {0}")]
    NetworkError(String),

    /// A network call did not finish within its deadline
    #[error("{operation} timed out after {seconds}s")]
    Timeout { operation: String, seconds: u64 },

    /// Provider answered with a non-success status or an error payload
    #[error("{provider} API error{}: {message}", fmt_status(.status))]
    ApiError {
        provider: String,
        status: Option<u16>,
        message: String,
    },

    /// Provider returned an empty result set
    #[error("No news articles available. Please try again later.")]
    NoArticles,

    /// Sentiment text did not match the expected grammar
    #[error("Malformed sentiment response: {0}")]
    MalformedResponse(String),

    /// Every retry attempt failed
    #[error("Failed to fetch news after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<SentimentError>,
    },

    /// Sentiment service call failed
    #[error("Failed to analyze sentiment: {0}")]
    LlmError(#[from] LLMError),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Prompt template could not be rendered
    #[error("Prompt template error: {0}")]
    TemplateError(#[from] minijinja::Error),
}

fn fmt_status(status: &Option<u16>) -> String {
    status.map(|s| format!(" {s}")).unwrap_or_default()
}

/// Result type alias for sentiment operations
pub type Result<T> = std::result::Result<T, SentimentError>;

impl SentimentError {
    /// Whether the news fetch retry loop should try again after this error
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimitExceeded { .. }
                | Self::NetworkError(_)
                | Self::Timeout { .. }
                | Self::ApiError { .. }
        )
    }

    /// The innermost cause, looking through [`SentimentError::RetriesExhausted`]
    pub fn root_cause(&self) -> &SentimentError {
        match self {
            Self::RetriesExhausted { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SentimentError::RateLimitExceeded {
            provider: "newsdata.io".to_string(),
        };
        assert_eq!(err.to_string(), "Rate limit exceeded for newsdata.io");

        let err = SentimentError::ApiError {
            provider: "newsdata.io".to_string(),
            status: Some(500),
            message: "upstream failure".to_string(),
        };
        assert_eq!(err.to_string(), "newsdata.io API error 500: upstream failure");

        let err = SentimentError::ApiError {
            provider: "newsdata.io".to_string(),
            status: None,
            message: "bad key".to_string(),
        };
        assert_eq!(err.to_string(), "newsdata.io API error: bad key");
    }

    #[test]
    fn test_retries_exhausted_names_last_cause() {
        let err = SentimentError::RetriesExhausted {
            attempts: 3,
            source: Box::new(SentimentError::NetworkError("connection refused".to_string())),
        };
        assert_eq!(
            err.to_string(),
            "Failed to fetch news after 3 attempts: Network error: connection refused"
        );
        assert!(matches!(err.root_cause(), SentimentError::NetworkError(_)));
    }

    #[test]
    fn test_retryable_classification() {
        assert!(SentimentError::NetworkError("x".into()).is_retryable());
        assert!(SentimentError::Timeout {
            operation: "news fetch".into(),
            seconds: 10
        }
        .is_retryable());
        assert!(!SentimentError::NoArticles.is_retryable());
        assert!(!SentimentError::ConfigError("missing key".into()).is_retryable());
        assert!(!SentimentError::MalformedResponse("x".into()).is_retryable());
    }

    #[test]
    fn test_llm_error_conversion() {
        let err: SentimentError = LLMError::AuthenticationFailed.into();
        assert!(err.to_string().contains("authentication failed"));
    }
}
