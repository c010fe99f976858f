//! Forex news sentiment pipeline
//!
//! This crate turns financial news into sentiment-derived market indicators:
//!
//! - Cached, retried news acquisition from newsdata.io ([`NewsFetcher`])
//! - Sentiment analysis through an OpenAI-compatible chat service ([`SentimentAnalyzer`])
//! - A tolerant parser for the service's line-oriented reply ([`SentimentResponseParser`])
//! - A bounded rolling sentiment history ([`SentimentHistory`])
//! - Pure indicator functions: volatility, trend strength, support/resistance,
//!   RSI, MACD, pivot points, ATR and market structure ([`metrics`])
//! - Per-currency-pair breakdowns ([`pairs`])
//! - A refresh loop publishing dashboard state over a watch channel ([`Orchestrator`])
//!
//! # Example
//!
//! ```rust,ignore
//! use fx_sentiment::{MonitorConfig, Orchestrator};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = MonitorConfig::default().with_env_keys();
//!     let handle = Orchestrator::from_config(&config)?.spawn();
//!
//!     let mut updates = handle.subscribe();
//!     while updates.changed().await.is_ok() {
//!         if let Some(metrics) = &updates.borrow().metrics {
//!             println!("RSI {:.1}, structure {}", metrics.rsi_value, metrics.market_structure);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod analyzer;
pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod history;
pub mod lexicon;
pub mod metrics;
pub mod model;
pub mod news;
pub mod orchestrator;
pub mod pairs;
pub mod parser;
pub mod prompts;

#[cfg(test)]
mod testing;

pub use analyzer::SentimentAnalyzer;
pub use api::{NewsDataClient, NewsProvider, RawArticle, RawNewsPage};
pub use cache::{CacheEntry, NewsCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{MonitorConfig, MonitorConfigBuilder};
pub use error::{Result, SentimentError};
pub use history::{HistoryPoint, SentimentHistory};
pub use model::{
    Article, MacdSignal, MarketMetrics, MarketStructure, Momentum, NewsBatch, PivotPoints,
    Polarity, SentimentLabel, SentimentSignal, SentimentSnapshot, TradingVolume,
};
pub use news::{NewsCategory, NewsFetcher};
pub use orchestrator::{CycleState, DashboardState, Orchestrator, OrchestratorHandle, TriggerOutcome};
pub use pairs::{PairSentiment, SentimentDistribution, analyze_pairs};
pub use parser::{LineToken, SentimentResponseParser};
