//! Domain types shared by the fetcher, parser, history and metrics engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A news article with its locally computed heuristic sentiment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub source_id: String,
    pub published_at: Option<DateTime<Utc>>,
    pub link: String,
    /// Lexicon score in `[0, 1]`; 0.5 when no keyword matched
    pub heuristic_sentiment: f64,
}

impl Article {
    /// Best available body text for prompts
    pub fn body(&self) -> &str {
        self.content
            .as_deref()
            .filter(|c| !c.is_empty())
            .or_else(|| self.description.as_deref().filter(|d| !d.is_empty()))
            .unwrap_or("No content available")
    }

    /// Whether title or description contain `needle`, ignoring case
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle))
    }

    /// Whether title, description or content mention `needle` verbatim
    pub fn mentions(&self, needle: &str) -> bool {
        self.title.contains(needle)
            || self.description.as_deref().is_some_and(|d| d.contains(needle))
            || self.content.as_deref().is_some_and(|c| c.contains(needle))
    }
}

/// One page of articles from the news provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsBatch {
    pub articles: Vec<Article>,
    /// Token for the next page, when the provider has more results
    pub next_page: Option<String>,
}

impl NewsBatch {
    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}

/// Direction of a sentiment signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Positive,
    Negative,
}

/// A single claim extracted from the sentiment service reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentSignal {
    pub title: String,
    /// Confidence in `[0, 1]`
    pub confidence: f64,
    pub polarity: Polarity,
    pub extracted_at: DateTime<Utc>,
}

/// One refresh cycle's complete sentiment result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentSnapshot {
    /// Overall sentiment in `[0, 1]`
    pub overall_sentiment: f64,
    pub positive_signals: Vec<SentimentSignal>,
    pub negative_signals: Vec<SentimentSignal>,
    pub analysis: String,
    pub observed_at: DateTime<Utc>,
}

impl SentimentSnapshot {
    /// Positive signals followed by negative signals
    pub fn signals(&self) -> impl Iterator<Item = &SentimentSignal> {
        self.positive_signals.iter().chain(self.negative_signals.iter())
    }

    /// Confidences of [`SentimentSnapshot::signals`], in the same order
    pub fn confidences(&self) -> Vec<f64> {
        self.signals().map(|s| s.confidence).collect()
    }

    pub fn label(&self) -> SentimentLabel {
        SentimentLabel::from_score(self.overall_sentiment)
    }
}

/// Five-way bucketing of a sentiment score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLabel {
    HighlyPositive,
    Positive,
    Neutral,
    Negative,
    HighlyNegative,
}

impl SentimentLabel {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            Self::HighlyPositive
        } else if score >= 0.6 {
            Self::Positive
        } else if score >= 0.4 {
            Self::Neutral
        } else if score >= 0.2 {
            Self::Negative
        } else {
            Self::HighlyNegative
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::HighlyPositive => "Highly Positive",
            Self::Positive => "Positive",
            Self::Neutral => "Neutral",
            Self::Negative => "Negative",
            Self::HighlyNegative => "Highly Negative",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Share of articles that talk about volume or flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradingVolume {
    High,
    Moderate,
    Low,
}

impl TradingVolume {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Moderate => "Moderate",
            Self::Low => "Low",
        }
    }
}

/// Direction of the recent average sentiment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Momentum {
    Bullish,
    Bearish,
    Neutral,
}

impl Momentum {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bullish => "bullish",
            Self::Bearish => "bearish",
            Self::Neutral => "neutral",
        }
    }
}

/// Crossover reading of the MACD-like signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MacdSignal {
    Buy,
    Sell,
    Neutral,
}

impl MacdSignal {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
            Self::Neutral => "neutral",
        }
    }
}

/// Swing-based trend classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketStructure {
    Uptrend,
    Downtrend,
    Ranging,
}

impl MarketStructure {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uptrend => "uptrend",
            Self::Downtrend => "downtrend",
            Self::Ranging => "ranging",
        }
    }
}

macro_rules! display_via_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_via_as_str!(TradingVolume, Momentum, MacdSignal, MarketStructure);

/// Classic pivot levels computed over signal confidences, each in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PivotPoints {
    pub r3: f64,
    pub r2: f64,
    pub r1: f64,
    pub pivot: f64,
    pub s1: f64,
    pub s2: f64,
    pub s3: f64,
}

impl Default for PivotPoints {
    fn default() -> Self {
        Self {
            r3: 0.7,
            r2: 0.65,
            r1: 0.6,
            pivot: 0.5,
            s1: 0.4,
            s2: 0.35,
            s3: 0.3,
        }
    }
}

impl PivotPoints {
    /// Levels from highest to lowest: r3, r2, r1, pivot, s1, s2, s3
    pub fn levels(&self) -> [f64; 7] {
        [self.r3, self.r2, self.r1, self.pivot, self.s1, self.s2, self.s3]
    }
}

/// Full panel of sentiment-derived indicators for one cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketMetrics {
    /// Standard deviation of signal confidences ×100, capped at 100
    pub volatility_index: f64,
    /// 75 when the recent history is monotonic, 25 when not, 50 when too short
    pub trend_strength: f64,
    pub support_level: f64,
    pub resistance_level: f64,
    pub trading_volume: TradingVolume,
    pub market_momentum: Momentum,
    pub rsi_value: f64,
    pub macd_signal: MacdSignal,
    pub pivot_points: PivotPoints,
    pub atr_value: f64,
    pub market_structure: MarketStructure,
}
