//! The seam between the sentiment analyzer and a chat service

use crate::{CompletionRequest, CompletionResponse, Result};
use async_trait::async_trait;

/// A chat-completion backend
///
/// Implementations map transport timeouts to [`crate::LLMError::Timeout`] so
/// callers can tell a slow service from a failing one.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Send one request and wait for the full reply
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Short name used in logs, e.g. "groq"
    fn name(&self) -> &str;
}
