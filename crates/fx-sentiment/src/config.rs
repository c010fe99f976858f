//! Configuration for the sentiment monitor

use crate::error::{Result, SentimentError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// newsdata.io REST endpoint
pub const NEWSDATA_API_BASE: &str = "https://newsdata.io/api/1";

/// Keyword filter sent with every news request
pub const FOREX_QUERY: &str =
    "forex OR \"foreign exchange\" OR currency OR financial markets OR economy OR trading";

/// Pairs analyzed by the currency-pair breakdown
pub const DEFAULT_CURRENCY_PAIRS: [&str; 4] = ["EUR/USD", "GBP/USD", "USD/JPY", "AUD/USD"];

/// Configuration for the sentiment monitor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// newsdata.io API key
    pub news_api_key: Option<String>,

    /// Base URL of the news provider
    pub news_api_base: String,

    /// `q` parameter of the news query
    pub news_query: String,

    /// `language` parameter of the news query
    pub news_language: String,

    /// `category` parameter of the news query
    pub news_category: String,

    /// Articles per request
    pub page_size: u32,

    /// Client-side request budget for the news provider, per minute
    pub provider_rate_limit: u32,

    /// Age after which a cached batch is stale
    pub cache_ttl: Duration,

    /// Width of a cache bucket
    pub cache_bucket: Duration,

    /// Number of buckets kept before the oldest is evicted
    pub cache_capacity: usize,

    /// Maximum number of attempts for a news fetch
    pub max_retries: u32,

    /// Backoff before the second attempt; doubles each attempt
    pub retry_backoff_base: Duration,

    /// Timeout for news provider calls
    pub request_timeout: Duration,

    /// Interval between scheduled refresh cycles
    pub refresh_interval: Duration,

    /// Number of points kept in the sentiment history
    pub history_capacity: usize,

    /// Sentiment service API key
    pub llm_api_key: Option<String>,

    /// Sentiment service base URL (OpenAI-compatible)
    pub llm_api_base: String,

    /// Model used for sentiment analysis
    pub model: String,

    /// Sampling temperature for the sentiment service
    pub temperature: f32,

    /// Token budget for the sentiment reply
    pub max_tokens: usize,

    /// Timeout for sentiment service calls
    pub llm_timeout: Duration,

    /// Currency pairs for the per-pair breakdown
    pub currency_pairs: Vec<String>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            news_api_key: None,
            news_api_base: NEWSDATA_API_BASE.to_string(),
            news_query: FOREX_QUERY.to_string(),
            news_language: "en".to_string(),
            news_category: "business".to_string(),
            page_size: 10,
            provider_rate_limit: 30,
            cache_ttl: Duration::from_secs(300),       // 5 minutes
            cache_bucket: Duration::from_secs(3600),   // 1 hour
            cache_capacity: 24,
            max_retries: 3,
            retry_backoff_base: Duration::from_secs(1),
            request_timeout: Duration::from_secs(10),
            refresh_interval: Duration::from_secs(300), // 5 minutes
            history_capacity: 8,
            llm_api_key: None,
            llm_api_base: fx_llm::providers::openai::GROQ_API_BASE.to_string(),
            model: "llama3-8b-8192".to_string(),
            temperature: 0.7,
            max_tokens: 1000,
            llm_timeout: Duration::from_secs(30),
            currency_pairs: DEFAULT_CURRENCY_PAIRS.iter().map(ToString::to_string).collect(),
        }
    }
}

impl MonitorConfig {
    /// Create a new configuration builder
    pub fn builder() -> MonitorConfigBuilder {
        MonitorConfigBuilder::default()
    }

    /// Load API keys and model overrides from the environment
    ///
    /// Reads `NEWSDATA_API_KEY`, `GROQ_API_KEY`, `GROQ_API_BASE` and `GROQ_MODEL`.
    pub fn with_env_keys(mut self) -> Self {
        if let Ok(key) = std::env::var("NEWSDATA_API_KEY") {
            self.news_api_key = Some(key);
        }
        if let Ok(key) = std::env::var("GROQ_API_KEY") {
            self.llm_api_key = Some(key);
        }
        if let Ok(base) = std::env::var("GROQ_API_BASE") {
            self.llm_api_base = base;
        }
        if let Ok(model) = std::env::var("GROQ_MODEL") {
            self.model = model;
        }
        self
    }

    /// Validate the non-credential settings
    pub fn validate(&self) -> Result<()> {
        if self.max_retries == 0 {
            return Err(SentimentError::ConfigError(
                "max_retries must be greater than 0".to_string(),
            ));
        }

        if self.history_capacity == 0 {
            return Err(SentimentError::ConfigError(
                "history_capacity must be greater than 0".to_string(),
            ));
        }

        if self.page_size == 0 {
            return Err(SentimentError::ConfigError(
                "page_size must be greater than 0".to_string(),
            ));
        }

        if self.cache_bucket.is_zero() {
            return Err(SentimentError::ConfigError(
                "cache_bucket must be longer than zero".to_string(),
            ));
        }

        if self.refresh_interval.is_zero() {
            return Err(SentimentError::ConfigError(
                "refresh_interval must be longer than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// The news provider key, or a fatal configuration error
    pub fn require_news_key(&self) -> Result<&str> {
        non_empty(self.news_api_key.as_deref()).ok_or_else(|| {
            SentimentError::ConfigError(
                "News API key is not configured (set NEWSDATA_API_KEY)".to_string(),
            )
        })
    }

    /// The sentiment service key, or a fatal configuration error
    pub fn require_llm_key(&self) -> Result<&str> {
        non_empty(self.llm_api_key.as_deref()).ok_or_else(|| {
            SentimentError::ConfigError(
                "Groq API key is not configured (set GROQ_API_KEY)".to_string(),
            )
        })
    }

    /// Get retry backoff duration for attempt number (0-based)
    pub fn retry_backoff(&self, attempt: u32) -> Duration {
        self.retry_backoff_base * 2_u32.saturating_pow(attempt)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Builder for MonitorConfig
#[derive(Debug, Default)]
pub struct MonitorConfigBuilder {
    news_api_key: Option<String>,
    news_api_base: Option<String>,
    page_size: Option<u32>,
    provider_rate_limit: Option<u32>,
    cache_ttl: Option<Duration>,
    max_retries: Option<u32>,
    retry_backoff_base: Option<Duration>,
    request_timeout: Option<Duration>,
    refresh_interval: Option<Duration>,
    history_capacity: Option<usize>,
    llm_api_key: Option<String>,
    llm_api_base: Option<String>,
    model: Option<String>,
    llm_timeout: Option<Duration>,
    currency_pairs: Option<Vec<String>>,
}

impl MonitorConfigBuilder {
    /// Set the news provider API key
    pub fn news_api_key(mut self, key: impl Into<String>) -> Self {
        self.news_api_key = Some(key.into());
        self
    }

    /// Set the news provider base URL
    pub fn news_api_base(mut self, base: impl Into<String>) -> Self {
        self.news_api_base = Some(base.into());
        self
    }

    /// Set the number of articles per request
    pub fn page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size);
        self
    }

    /// Set the provider request budget per minute
    pub fn provider_rate_limit(mut self, per_minute: u32) -> Self {
        self.provider_rate_limit = Some(per_minute);
        self
    }

    /// Set the cache TTL
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    /// Set maximum fetch attempts
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    /// Set retry backoff base duration
    pub fn retry_backoff_base(mut self, duration: Duration) -> Self {
        self.retry_backoff_base = Some(duration);
        self
    }

    /// Set news request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set the refresh interval
    pub fn refresh_interval(mut self, duration: Duration) -> Self {
        self.refresh_interval = Some(duration);
        self
    }

    /// Set the sentiment history capacity
    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = Some(capacity);
        self
    }

    /// Set the sentiment service API key
    pub fn llm_api_key(mut self, key: impl Into<String>) -> Self {
        self.llm_api_key = Some(key.into());
        self
    }

    /// Set the sentiment service base URL
    pub fn llm_api_base(mut self, base: impl Into<String>) -> Self {
        self.llm_api_base = Some(base.into());
        self
    }

    /// Set the model name
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the sentiment service timeout
    pub fn llm_timeout(mut self, duration: Duration) -> Self {
        self.llm_timeout = Some(duration);
        self
    }

    /// Set the currency pairs to break down
    pub fn currency_pairs(mut self, pairs: Vec<String>) -> Self {
        self.currency_pairs = Some(pairs);
        self
    }

    /// Load keys from the environment for any key not set explicitly
    pub fn with_env_keys(mut self) -> Self {
        let env = MonitorConfig::default().with_env_keys();
        self.news_api_key = self.news_api_key.or(env.news_api_key);
        self.llm_api_key = self.llm_api_key.or(env.llm_api_key);
        if std::env::var("GROQ_API_BASE").is_ok() {
            self.llm_api_base = self.llm_api_base.or(Some(env.llm_api_base));
        }
        if std::env::var("GROQ_MODEL").is_ok() {
            self.model = self.model.or(Some(env.model));
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<MonitorConfig> {
        let defaults = MonitorConfig::default();

        let config = MonitorConfig {
            news_api_key: self.news_api_key,
            news_api_base: self.news_api_base.unwrap_or(defaults.news_api_base),
            page_size: self.page_size.unwrap_or(defaults.page_size),
            provider_rate_limit: self.provider_rate_limit.unwrap_or(defaults.provider_rate_limit),
            cache_ttl: self.cache_ttl.unwrap_or(defaults.cache_ttl),
            max_retries: self.max_retries.unwrap_or(defaults.max_retries),
            retry_backoff_base: self.retry_backoff_base.unwrap_or(defaults.retry_backoff_base),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            refresh_interval: self.refresh_interval.unwrap_or(defaults.refresh_interval),
            history_capacity: self.history_capacity.unwrap_or(defaults.history_capacity),
            llm_api_key: self.llm_api_key,
            llm_api_base: self.llm_api_base.unwrap_or(defaults.llm_api_base),
            model: self.model.unwrap_or(defaults.model),
            llm_timeout: self.llm_timeout.unwrap_or(defaults.llm_timeout),
            currency_pairs: self.currency_pairs.unwrap_or(defaults.currency_pairs),
            ..defaults
        };

        config.validate()?;
        Ok(config)
    }
}
