//! Time-bucketed cache for fetched news batches
//!
//! Entries are keyed by the wall-clock hour (`news-<hours since epoch>`) and are
//! fresh for a fixed TTL after they were fetched. Stale entries stay in place so
//! the fetcher can fall back to them when the provider is rate limiting.

use crate::clock::Clock;
use crate::model::NewsBatch;
use cached::{Cached, SizedCache};
use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// A cached news batch with its bucket and fetch time
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub bucket_key: String,
    pub data: NewsBatch,
    pub fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Whether the entry is younger than `ttl` at `now`
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        let ttl = TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX);
        now - self.fetched_at < ttl
    }
}

/// Thread-safe news cache with an injected clock
pub struct NewsCache {
    entries: Arc<RwLock<SizedCache<String, CacheEntry>>>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    bucket: Duration,
}

impl NewsCache {
    /// Create a cache holding at most `capacity` buckets
    pub fn new(ttl: Duration, bucket: Duration, capacity: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(SizedCache::with_size(capacity.max(1)))),
            clock,
            ttl,
            bucket,
        }
    }

    /// Bucket key for the current time
    pub fn current_key(&self) -> String {
        self.key_at(self.clock.now())
    }

    /// Bucket key for an arbitrary time
    pub fn key_at(&self, at: DateTime<Utc>) -> String {
        let width = i64::try_from(self.bucket.as_millis()).unwrap_or(i64::MAX).max(1);
        format!("news-{}", at.timestamp_millis().div_euclid(width))
    }

    /// Batch for `key` if it is still within the TTL
    pub async fn get_fresh(&self, key: &str) -> Option<NewsBatch> {
        let now = self.clock.now();
        let mut entries = self.entries.write().await;
        match entries.cache_get(key) {
            Some(entry) if entry.is_fresh(now, self.ttl) => {
                tracing::debug!("Cache hit for key: {}", key);
                Some(entry.data.clone())
            }
            Some(_) => {
                tracing::debug!("Cache entry for key {} is stale", key);
                None
            }
            None => {
                tracing::debug!("Cache miss for key: {}", key);
                None
            }
        }
    }

    /// Batch for `key` regardless of age
    pub async fn get_any(&self, key: &str) -> Option<NewsBatch> {
        let mut entries = self.entries.write().await;
        entries.cache_get(key).map(|entry| entry.data.clone())
    }

    /// Store `data` under `key`, stamped with the current time
    pub async fn insert(&self, key: impl Into<String>, data: NewsBatch) {
        let key = key.into();
        let entry = CacheEntry {
            bucket_key: key.clone(),
            data,
            fetched_at: self.clock.now(),
        };
        let mut entries = self.entries.write().await;
        let _ = entries.cache_set(key, entry);
    }

    /// Get the number of cached buckets
    pub async fn len(&self) -> usize {
        let entries = self.entries.read().await;
        entries.cache_size()
    }

    /// Check if the cache is empty
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Clone for NewsCache {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            clock: Arc::clone(&self.clock),
            ttl: self.ttl,
            bucket: self.bucket,
        }
    }
}
