//! One-shot chat completion request and reply

use crate::messages::{Message, Role};
use serde::{Deserialize, Serialize};

/// Token budget used when the caller does not set one
pub const DEFAULT_MAX_TOKENS: usize = 1000;

/// A single chat completion: optional persona, user turns, sampling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,

    /// Persona sent ahead of the conversation as a system message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    pub messages: Vec<Message>,

    pub max_tokens: usize,

    /// Sampling temperature; the provider default applies when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    pub fn builder(model: impl Into<String>) -> CompletionRequestBuilder {
        CompletionRequestBuilder {
            request: CompletionRequest {
                model: model.into(),
                system: None,
                messages: Vec::new(),
                max_tokens: DEFAULT_MAX_TOKENS,
                temperature: None,
            },
        }
    }

    /// Text of the first user turn
    pub fn user_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == Role::User)
            .and_then(Message::text)
    }
}

/// Builder for [`CompletionRequest`]
#[derive(Debug)]
pub struct CompletionRequestBuilder {
    request: CompletionRequest,
}

impl CompletionRequestBuilder {
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.request.system = Some(system.into());
        self
    }

    /// Append a user turn
    pub fn user(mut self, text: impl Into<String>) -> Self {
        self.request.messages.push(Message::user(text));
        self
    }

    pub fn message(mut self, message: Message) -> Self {
        self.request.messages.push(message);
        self
    }

    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.request.max_tokens = max_tokens;
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.request.temperature = Some(temperature);
        self
    }

    pub fn build(self) -> CompletionRequest {
        self.request
    }
}

/// Why generation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndTurn,
    /// Cut off by `max_tokens`
    MaxTokens,
    /// Withheld by the provider's content filter
    ContentFilter,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: usize,
    pub output_tokens: usize,
}

impl TokenUsage {
    pub fn total(&self) -> usize {
        self.input_tokens + self.output_tokens
    }
}

/// The assistant's reply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub message: Message,
    pub stop_reason: StopReason,
    pub usage: TokenUsage,
}

impl CompletionResponse {
    /// Assistant text, if the model produced any
    pub fn text(&self) -> Option<&str> {
        self.message.text()
    }

    /// Whether the reply hit the token budget and may be missing its tail
    pub fn is_truncated(&self) -> bool {
        self.stop_reason == StopReason::MaxTokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let request = CompletionRequest::builder("llama3-8b-8192")
            .system("You are an expert forex analyst")
            .user("Analyze these articles")
            .max_tokens(500)
            .temperature(0.7)
            .build();

        assert_eq!(request.model, "llama3-8b-8192");
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.max_tokens, 500);
        assert_eq!(request.temperature, Some(0.7));
        assert_eq!(request.system.as_deref(), Some("You are an expert forex analyst"));
        assert_eq!(request.user_text(), Some("Analyze these articles"));
    }

    #[test]
    fn test_builder_defaults() {
        let request = CompletionRequest::builder("m").build();
        assert_eq!(request.max_tokens, DEFAULT_MAX_TOKENS);
        assert!(request.temperature.is_none());
        assert!(request.user_text().is_none());
    }

    #[test]
    fn test_user_text_skips_other_roles() {
        let request = CompletionRequest::builder("m")
            .message(Message::assistant("earlier reply"))
            .user("digest")
            .build();
        assert_eq!(request.user_text(), Some("digest"));
    }

    #[test]
    fn test_truncation_and_usage() {
        let response = CompletionResponse {
            message: Message::assistant("SENTIMENT: 0.6"),
            stop_reason: StopReason::MaxTokens,
            usage: TokenUsage {
                input_tokens: 100,
                output_tokens: 50,
            },
        };
        assert!(response.is_truncated());
        assert_eq!(response.usage.total(), 150);
    }
}
