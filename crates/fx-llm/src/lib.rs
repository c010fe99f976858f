//! Chat-completion client layer for fx-sentiment
//!
//! This crate provides the provider-agnostic pieces used to talk to the
//! external sentiment service:
//!
//! - Message types for chat-style requests
//! - Completion request/response types
//! - The [`LLMProvider`] trait the sentiment analyzer is written against
//! - An OpenAI-compatible provider (Groq by default, behind the `openai` feature)

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;

// Re-export main types
pub use completion::{
    CompletionRequest, CompletionRequestBuilder, CompletionResponse, DEFAULT_MAX_TOKENS, StopReason,
    TokenUsage,
};
pub use error::{LLMError, Result};
pub use messages::{Message, Role};
pub use provider::LLMProvider;

// Provider implementations (feature-gated)
#[cfg(feature = "openai")]
pub mod providers;
