//! Per-currency-pair sentiment breakdown

use crate::analyzer::SentimentAnalyzer;
use crate::error::{Result, SentimentError};
use crate::model::{Article, SentimentLabel, SentimentSnapshot};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Signal split and overall score for one currency pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairSentiment {
    pub pair: String,
    pub article_count: usize,
    /// Percent of signals that are positive
    pub positive: u32,
    /// Percent of signals that are negative
    pub negative: u32,
    pub neutral: u32,
    pub overall_sentiment: f64,
}

impl PairSentiment {
    /// Placeholder for a pair with no matching articles
    pub fn without_coverage(pair: impl Into<String>) -> Self {
        Self {
            pair: pair.into(),
            article_count: 0,
            positive: 0,
            negative: 0,
            neutral: 0,
            overall_sentiment: 0.5,
        }
    }

    pub fn from_snapshot(
        pair: impl Into<String>,
        article_count: usize,
        snapshot: &SentimentSnapshot,
    ) -> Self {
        let (positive, negative, neutral) = split_percentages(
            snapshot.positive_signals.len(),
            snapshot.negative_signals.len(),
        );
        Self {
            pair: pair.into(),
            article_count,
            positive,
            negative,
            neutral,
            overall_sentiment: snapshot.overall_sentiment,
        }
    }

    pub fn label(&self) -> SentimentLabel {
        SentimentLabel::from_score(self.overall_sentiment)
    }
}

/// Rounded positive/negative shares; neutral takes the rest
///
/// With no signals at all the pair is reported as entirely neutral.
pub fn split_percentages(positive: usize, negative: usize) -> (u32, u32, u32) {
    let total = positive + negative;
    if total == 0 {
        return (0, 0, 100);
    }
    let percent = |count: usize| (count as f64 / total as f64 * 100.0).round() as u32;
    let (pos, neg) = (percent(positive), percent(negative));
    (pos, neg, 100_u32.saturating_sub(pos + neg))
}

/// Articles whose title, description or content mention `pair` verbatim
pub fn articles_for_pair(articles: &[Article], pair: &str) -> Vec<Article> {
    articles.iter().filter(|a| a.mentions(pair)).cloned().collect()
}

/// Analyze every pair concurrently
///
/// Pairs without articles are answered locally. Any service failure fails the
/// whole breakdown.
#[instrument(skip(analyzer, articles), fields(articles = articles.len()))]
pub async fn analyze_pairs(
    analyzer: &SentimentAnalyzer,
    articles: &[Article],
    pairs: &[String],
) -> Result<Vec<PairSentiment>> {
    let tasks = pairs.iter().map(|pair| async move {
        let subset = articles_for_pair(articles, pair);
        if subset.is_empty() {
            debug!("No articles mention {}", pair);
            return Ok::<_, SentimentError>(PairSentiment::without_coverage(pair.as_str()));
        }
        let snapshot = analyzer.analyze(&subset).await?;
        Ok(PairSentiment::from_snapshot(pair.as_str(), subset.len(), &snapshot))
    });

    try_join_all(tasks).await
}

/// Share of pairs in each sentiment band, as rounded percentages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentDistribution {
    pub highly_positive: u32,
    pub positive: u32,
    pub neutral: u32,
    pub negative: u32,
    pub highly_negative: u32,
}

impl SentimentDistribution {
    /// All zero when `pairs` is empty
    pub fn from_pairs(pairs: &[PairSentiment]) -> Self {
        let scores: Vec<f64> = pairs.iter().map(|p| p.overall_sentiment).collect();
        Self::from_scores(&scores)
    }

    pub fn from_scores(scores: &[f64]) -> Self {
        if scores.is_empty() {
            return Self::default();
        }

        let count = |label: SentimentLabel| {
            let hits = scores
                .iter()
                .filter(|s| SentimentLabel::from_score(**s) == label)
                .count();
            (hits as f64 / scores.len() as f64 * 100.0).round() as u32
        };

        Self {
            highly_positive: count(SentimentLabel::HighlyPositive),
            positive: count(SentimentLabel::Positive),
            neutral: count(SentimentLabel::Neutral),
            negative: count(SentimentLabel::Negative),
            highly_negative: count(SentimentLabel::HighlyNegative),
        }
    }

    /// `(label, percent)` rows from most positive to most negative
    pub fn rows(&self) -> [(SentimentLabel, u32); 5] {
        [
            (SentimentLabel::HighlyPositive, self.highly_positive),
            (SentimentLabel::Positive, self.positive),
            (SentimentLabel::Neutral, self.neutral),
            (SentimentLabel::Negative, self.negative),
            (SentimentLabel::HighlyNegative, self.highly_negative),
        ]
    }
}
