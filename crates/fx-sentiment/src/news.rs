//! Cached, retried news acquisition

use crate::api::{NewsDataClient, NewsProvider, RawArticle, RawNewsPage};
use crate::cache::NewsCache;
use crate::clock::{Clock, SystemClock};
use crate::config::MonitorConfig;
use crate::error::{Result, SentimentError};
use crate::lexicon::heuristic_sentiment;
use crate::model::{Article, NewsBatch};
use chrono::{DateTime, NaiveDateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// Which articles of the cached batch a caller wants
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NewsCategory {
    #[default]
    AllNews,
    /// Case-insensitive match on title or description
    Search(String),
}

impl NewsCategory {
    /// A search category, or `AllNews` for a blank term
    pub fn search(term: impl Into<String>) -> Self {
        let term = term.into();
        if term.trim().is_empty() {
            Self::AllNews
        } else {
            Self::Search(term.trim().to_string())
        }
    }

    fn apply(&self, batch: NewsBatch) -> NewsBatch {
        match self {
            Self::AllNews => batch,
            Self::Search(term) => NewsBatch {
                articles: batch
                    .articles
                    .into_iter()
                    .filter(|a| a.matches_search(term))
                    .collect(),
                next_page: batch.next_page,
            },
        }
    }
}

/// News fetcher owning the bucketed cache
pub struct NewsFetcher {
    provider: Arc<dyn NewsProvider>,
    cache: NewsCache,
    config: MonitorConfig,
    fetch_lock: Mutex<()>,
}

impl NewsFetcher {
    pub fn new(provider: Arc<dyn NewsProvider>, cache: NewsCache, config: &MonitorConfig) -> Self {
        Self {
            provider,
            cache,
            config: config.clone(),
            fetch_lock: Mutex::new(()),
        }
    }

    /// Fetcher backed by newsdata.io and the system clock
    pub fn from_config(config: &MonitorConfig) -> Result<Self> {
        let provider = Arc::new(NewsDataClient::from_config(config)?);
        Ok(Self::with_clock(provider, config, Arc::new(SystemClock)))
    }

    /// Fetcher with a fresh cache driven by `clock`
    pub fn with_clock(
        provider: Arc<dyn NewsProvider>,
        config: &MonitorConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let cache = NewsCache::new(
            config.cache_ttl,
            config.cache_bucket,
            config.cache_capacity,
            clock,
        );
        Self::new(provider, cache, config)
    }

    pub fn cache(&self) -> &NewsCache {
        &self.cache
    }

    /// Latest articles, served from the current hour bucket while fresh
    ///
    /// Concurrent callers share one provider call. When the provider is rate
    /// limiting, a stale entry for the current bucket is served instead.
    #[instrument(skip(self))]
    pub async fn fetch(&self, category: &NewsCategory) -> Result<NewsBatch> {
        let key = self.cache.current_key();

        if let Some(batch) = self.cache.get_fresh(&key).await {
            debug!("Returning cached news data");
            return Ok(category.apply(batch));
        }

        let _guard = self.fetch_lock.lock().await;

        // Another caller may have filled the bucket while we waited
        if let Some(batch) = self.cache.get_fresh(&key).await {
            return Ok(category.apply(batch));
        }

        match self.provider.latest().await {
            Ok(page) => {
                if page.articles.is_empty() {
                    return Err(SentimentError::NoArticles);
                }
                let batch = enrich_page(page);
                info!(articles = batch.len(), "Fetched news from provider");
                self.cache.insert(key, batch.clone()).await;
                Ok(category.apply(batch))
            }
            Err(err @ SentimentError::RateLimitExceeded { .. }) => {
                match self.cache.get_any(&key).await {
                    Some(stale) => {
                        warn!("Rate limit hit, serving stale cache for {}", key);
                        Ok(category.apply(stale))
                    }
                    None => Err(err),
                }
            }
            Err(err) => Err(err),
        }
    }

    /// [`NewsFetcher::fetch`] with exponential backoff between attempts
    ///
    /// Configuration errors and empty results are returned immediately. After
    /// the last attempt the final error is wrapped in
    /// [`SentimentError::RetriesExhausted`].
    pub async fn retry_fetch(&self, category: &NewsCategory, max_retries: u32) -> Result<NewsBatch> {
        let attempts = max_retries.max(1);
        let mut attempt = 0;

        loop {
            match self.fetch(category).await {
                Ok(batch) => return Ok(batch),
                Err(err) if !err.is_retryable() => return Err(err),
                Err(err) => {
                    attempt += 1;
                    if attempt >= attempts {
                        return Err(SentimentError::RetriesExhausted {
                            attempts,
                            source: Box::new(err),
                        });
                    }

                    let delay = self.config.retry_backoff(attempt - 1);
                    warn!(
                        "Fetch attempt {}/{} failed: {}. Retrying in {:?}",
                        attempt, attempts, err, delay
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// [`NewsFetcher::retry_fetch`] with the configured retry count
    pub async fn refresh(&self, category: &NewsCategory) -> Result<NewsBatch> {
        self.retry_fetch(category, self.config.max_retries).await
    }

    /// Follow a `nextPage` token. Pages are not cached.
    #[instrument(skip(self))]
    pub async fn next_page(&self, token: &str) -> Result<NewsBatch> {
        let page = self.provider.page(token).await?;
        Ok(enrich_page(page))
    }
}

fn enrich_page(page: RawNewsPage) -> NewsBatch {
    NewsBatch {
        articles: page.articles.into_iter().map(enrich).collect(),
        next_page: page.next_page,
    }
}

fn enrich(raw: RawArticle) -> Article {
    let title = raw.title.unwrap_or_default();
    let heuristic_sentiment = heuristic_sentiment(&title, raw.description.as_deref());

    Article {
        published_at: raw.pub_date.as_deref().and_then(parse_pub_date),
        title,
        description: raw.description,
        content: raw.content,
        source_id: raw.source_id.unwrap_or_default(),
        link: raw.link.unwrap_or_default(),
        heuristic_sentiment,
    }
}

/// newsdata.io dates look like `2024-03-01 12:00:00` (UTC)
fn parse_pub_date(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value.trim(), "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value.trim())
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        })
}
