//! Shared test fixtures

use crate::model::Article;
use async_trait::async_trait;
use fx_llm::{CompletionRequest, CompletionResponse, LLMProvider, Message, StopReason, TokenUsage};
use mockall::mock;

mock! {
    pub Llm {}

    #[async_trait]
    impl LLMProvider for Llm {
        async fn complete(&self, request: CompletionRequest) -> fx_llm::Result<CompletionResponse>;
        fn name(&self) -> &str;
    }
}

pub fn reply(text: &str) -> CompletionResponse {
    CompletionResponse {
        message: Message::assistant(text),
        stop_reason: StopReason::EndTurn,
        usage: TokenUsage::default(),
    }
}

/// Text of the user message sent to the sentiment service
pub fn prompt_of(request: &CompletionRequest) -> &str {
    request.user_text().unwrap_or_default()
}

pub fn article(title: &str, description: Option<&str>) -> Article {
    Article {
        title: title.to_string(),
        description: description.map(str::to_string),
        content: None,
        source_id: "reuters".to_string(),
        published_at: None,
        link: String::new(),
        heuristic_sentiment: 0.5,
    }
}
