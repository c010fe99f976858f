//! newsdata.io client

use super::NewsProvider;
use crate::config::MonitorConfig;
use crate::error::{Result, SentimentError};
use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

const PROVIDER: &str = "newsdata.io";

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Article as returned by newsdata.io
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawArticle {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub source_id: Option<String>,
    #[serde(rename = "pubDate", default)]
    pub pub_date: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

/// One page of raw results
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawNewsPage {
    pub articles: Vec<RawArticle>,
    pub next_page: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewsDataResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    results: Value,
    #[serde(rename = "nextPage", default)]
    next_page: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// newsdata.io client with client-side rate limiting
#[derive(Debug, Clone)]
pub struct NewsDataClient {
    client: Client,
    api_key: String,
    base_url: String,
    query: String,
    language: String,
    category: String,
    page_size: u32,
    timeout: Duration,
    rate_limiter: SharedRateLimiter,
}

impl NewsDataClient {
    /// Create a client from the monitor configuration
    ///
    /// Fails with [`SentimentError::ConfigError`] when no API key is configured.
    pub fn from_config(config: &MonitorConfig) -> Result<Self> {
        let api_key = config.require_news_key()?.to_string();

        let quota = Quota::per_minute(
            NonZeroU32::new(config.provider_rate_limit).unwrap_or(NonZeroU32::MIN),
        );

        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| SentimentError::ConfigError(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: config.news_api_base.trim_end_matches('/').to_string(),
            query: config.news_query.clone(),
            language: config.news_language.clone(),
            category: config.news_category.clone(),
            page_size: config.page_size,
            timeout: config.request_timeout,
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        })
    }

    /// Create from `NEWSDATA_API_KEY` with default settings
    pub fn from_env() -> Result<Self> {
        Self::from_config(&MonitorConfig::default().with_env_keys())
    }

    async fn get(&self, params: &[(&str, String)]) -> Result<RawNewsPage> {
        self.rate_limiter.until_ready().await;

        let response = self
            .client
            .get(format!("{}/news", self.base_url))
            .query(params)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        debug!("API Response status: {}", status);

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(SentimentError::RateLimitExceeded {
                provider: PROVIDER.to_string(),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SentimentError::ApiError {
                provider: PROVIDER.to_string(),
                status: Some(status.as_u16()),
                message: body,
            });
        }

        let body: Value = response.json().await.map_err(|e| self.classify(e))?;
        parse_response(body)
    }

    fn classify(&self, err: reqwest::Error) -> SentimentError {
        if err.is_timeout() {
            SentimentError::Timeout {
                operation: "news fetch".to_string(),
                seconds: self.timeout.as_secs(),
            }
        } else if err.is_connect() || err.is_request() {
            SentimentError::NetworkError(format!(
                "Unable to reach the news service. Please check your internet connection. ({err})"
            ))
        } else {
            SentimentError::ApiError {
                provider: PROVIDER.to_string(),
                status: err.status().map(|s| s.as_u16()),
                message: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl NewsProvider for NewsDataClient {
    #[instrument(skip(self), fields(category = %self.category, size = self.page_size))]
    async fn latest(&self) -> Result<RawNewsPage> {
        debug!("Making API request to {}", PROVIDER);
        let params = [
            ("apikey", self.api_key.clone()),
            ("language", self.language.clone()),
            ("category", self.category.clone()),
            ("q", self.query.clone()),
            ("size", self.page_size.to_string()),
        ];
        self.get(&params).await
    }

    #[instrument(skip(self))]
    async fn page(&self, token: &str) -> Result<RawNewsPage> {
        debug!("Fetching next page with token: {}", token);
        let params = [("apikey", self.api_key.clone()), ("page", token.to_string())];
        self.get(&params).await
    }
}

/// Interpret a newsdata.io response body
///
/// Error payloads carry `status: "error"` and put the message either at the top
/// level or inside `results`.
fn parse_response(body: Value) -> Result<RawNewsPage> {
    let response: NewsDataResponse = serde_json::from_value(body)?;

    if response.status.as_deref() == Some("error") {
        let message = response
            .message
            .or_else(|| {
                response
                    .results
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "Invalid response from news API".to_string());

        return Err(SentimentError::ApiError {
            provider: PROVIDER.to_string(),
            status: None,
            message,
        });
    }

    if !response.results.is_array() {
        return Err(SentimentError::ApiError {
            provider: PROVIDER.to_string(),
            status: None,
            message: "Invalid response format from news API".to_string(),
        });
    }

    let articles: Vec<RawArticle> = serde_json::from_value(response.results)?;

    Ok(RawNewsPage {
        articles,
        next_page: response.next_page,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_creation() {
        let config = MonitorConfig::builder()
            .news_api_key("test_key")
            .news_api_base("https://newsdata.example.com/api/1/")
            .build()
            .unwrap();

        let client = NewsDataClient::from_config(&config).unwrap();
        assert_eq!(client.api_key, "test_key");
        assert_eq!(client.base_url, "https://newsdata.example.com/api/1");
        assert_eq!(client.page_size, 10);
        assert_eq!(client.category, "business");
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let result = NewsDataClient::from_config(&MonitorConfig::default());
        assert!(matches!(result, Err(SentimentError::ConfigError(_))));
    }

    #[test]
    fn test_parse_success() {
        let body = json!({
            "status": "success",
            "totalResults": 2,
            "results": [
                {
                    "title": "Dollar gains on strong data",
                    "description": "The greenback rose",
                    "content": null,
                    "source_id": "reuters",
                    "pubDate": "2024-03-01 12:00:00",
                    "link": "https://example.com/a"
                },
                {
                    "title": "Euro slips",
                    "source_id": "ft",
                    "pubDate": "2024-03-01 11:00:00",
                    "link": "https://example.com/b"
                }
            ],
            "nextPage": "1709290000"
        });

        let page = parse_response(body).unwrap();
        assert_eq!(page.articles.len(), 2);
        assert_eq!(page.articles[0].source_id.as_deref(), Some("reuters"));
        assert_eq!(page.articles[1].description, None);
        assert_eq!(page.next_page.as_deref(), Some("1709290000"));
    }

    #[test]
    fn test_parse_error_status() {
        let body = json!({
            "status": "error",
            "results": {"message": "API key is invalid", "code": "Unauthorized"}
        });

        match parse_response(body) {
            Err(SentimentError::ApiError { message, status, .. }) => {
                assert_eq!(message, "API key is invalid");
                assert_eq!(status, None);
            }
            other => panic!("Expected ApiError, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_non_array_results() {
        let body = json!({"status": "success", "results": {"unexpected": true}});
        assert!(matches!(
            parse_response(body),
            Err(SentimentError::ApiError { .. })
        ));
    }

    #[test]
    fn test_parse_empty_results() {
        let page = parse_response(json!({"status": "success", "results": []})).unwrap();
        assert!(page.articles.is_empty());
        assert!(page.next_page.is_none());
    }
}
