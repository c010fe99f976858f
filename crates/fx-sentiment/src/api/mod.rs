//! News provider clients

pub mod newsdata;

use crate::error::Result;
use async_trait::async_trait;

pub use newsdata::{NewsDataClient, RawArticle, RawNewsPage};

/// Source of raw news pages
///
/// The fetcher is written against this trait so tests can script provider
/// behaviour (failures, rate limiting, empty pages) without a network.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// Latest articles for the configured forex query
    async fn latest(&self) -> Result<RawNewsPage>;

    /// A follow-up page identified by a `nextPage` token
    async fn page(&self, token: &str) -> Result<RawNewsPage>;
}
