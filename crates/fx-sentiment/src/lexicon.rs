//! Keyword heuristic that gives every fetched article a quick sentiment score
//!
//! Matching is substring-based on the lowercased text and each lexicon word is
//! counted at most once, so "uptick" counts as "up".

const POSITIVE_WORDS: &[&str] = &[
    "bullish", "surge", "gain", "positive", "up", "rise", "growth", "strong", "boost", "rally",
    "recover",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bearish", "fall", "drop", "negative", "down", "decline", "weak", "loss", "crash", "plunge",
    "risk",
];

/// Positive and negative keyword hits for a piece of text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeywordHits {
    pub positive: usize,
    pub negative: usize,
}

impl KeywordHits {
    /// Count lexicon words contained in `text`
    pub fn count(text: &str) -> Self {
        let lower = text.to_lowercase();
        Self {
            positive: POSITIVE_WORDS.iter().filter(|w| lower.contains(*w)).count(),
            negative: NEGATIVE_WORDS.iter().filter(|w| lower.contains(*w)).count(),
        }
    }

    /// `positive / (positive + negative)`, or 0.5 with no hits
    pub fn score(self) -> f64 {
        let total = self.positive + self.negative;
        if total == 0 {
            return 0.5;
        }
        (self.positive as f64 / total as f64).clamp(0.0, 1.0)
    }
}

/// Heuristic sentiment of `title` plus optional `description`, in `[0, 1]`
pub fn heuristic_sentiment(title: &str, description: Option<&str>) -> f64 {
    let text = format!("{} {}", title, description.unwrap_or(""));
    KeywordHits::count(&text).score()
}
