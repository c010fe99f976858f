//! Sentiment service client: prompt, call, parse

use crate::clock::{Clock, SystemClock};
use crate::config::MonitorConfig;
use crate::error::{Result, SentimentError};
use crate::model::{Article, SentimentSnapshot};
use crate::parser::SentimentResponseParser;
use crate::prompts::{SYSTEM_PROMPT, render_sentiment_prompt};
use fx_llm::providers::{OpenAIConfig, OpenAIProvider};
use fx_llm::{CompletionRequest, LLMError, LLMProvider};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Turns a batch of articles into a [`SentimentSnapshot`]
///
/// Failures are surfaced immediately; there is no retry layer around the
/// sentiment service.
pub struct SentimentAnalyzer {
    provider: Arc<dyn LLMProvider>,
    parser: SentimentResponseParser,
    clock: Arc<dyn Clock>,
    model: String,
    temperature: f32,
    max_tokens: usize,
    timeout: Duration,
}

impl SentimentAnalyzer {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &MonitorConfig) -> Result<Self> {
        Ok(Self {
            provider,
            parser: SentimentResponseParser::new()?,
            clock: Arc::new(SystemClock),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout: config.llm_timeout,
        })
    }

    /// Analyzer backed by the OpenAI-compatible provider (Groq by default)
    pub fn from_config(config: &MonitorConfig) -> Result<Self> {
        let api_key = config.require_llm_key()?;
        let llm_config = OpenAIConfig::new(api_key)
            .with_api_base(config.llm_api_base.clone())
            .with_timeout(config.llm_timeout.as_secs().max(1));
        let provider = OpenAIProvider::with_config(llm_config)?;
        Self::new(Arc::new(provider), config)
    }

    /// Stamp snapshots with `clock` instead of the system time
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Build the chat request for `articles`
    pub fn build_request(&self, articles: &[Article]) -> Result<CompletionRequest> {
        let prompt = render_sentiment_prompt(articles)?;
        Ok(CompletionRequest::builder(self.model.clone())
            .system(SYSTEM_PROMPT)
            .user(prompt)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build())
    }

    /// Ask the sentiment service about `articles` and parse its reply
    #[instrument(skip(self, articles), fields(articles = articles.len(), model = %self.model))]
    pub async fn analyze(&self, articles: &[Article]) -> Result<SentimentSnapshot> {
        if articles.is_empty() {
            return Err(SentimentError::NoArticles);
        }

        let request = self.build_request(articles)?;
        debug!("Analyzing sentiment for {} articles", articles.len());

        let response = match tokio::time::timeout(self.timeout, self.provider.complete(request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(LLMError::Timeout(_))) | Err(_) => return Err(self.timeout_error()),
            Ok(Err(err)) => return Err(err.into()),
        };

        if response.is_truncated() {
            warn!("Sentiment reply hit the token limit of {}", self.max_tokens);
        }

        let text = response
            .text()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                SentimentError::MalformedResponse("No response content from sentiment service".to_string())
            })?;

        let snapshot = self.parser.parse_at(text, self.clock.now())?;
        info!(
            overall = snapshot.overall_sentiment,
            positive = snapshot.positive_signals.len(),
            negative = snapshot.negative_signals.len(),
            "Sentiment analysis complete"
        );
        Ok(snapshot)
    }

    fn timeout_error(&self) -> SentimentError {
        SentimentError::Timeout {
            operation: "sentiment analysis".to_string(),
            seconds: self.timeout.as_secs(),
        }
    }
}
