//! Rolling window of overall sentiment readings

use crate::model::SentimentSnapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default number of readings kept
pub const DEFAULT_HISTORY_CAPACITY: usize = 8;

/// One overall-sentiment reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub observed_at: DateTime<Utc>,
    pub overall_sentiment: f64,
}

/// Bounded, append-only sentiment history; the oldest point is evicted when full
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentHistory {
    points: VecDeque<HistoryPoint>,
    capacity: usize,
}

impl Default for SentimentHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl SentimentHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record the snapshot's overall sentiment
    pub fn append(&mut self, snapshot: &SentimentSnapshot) {
        self.push(HistoryPoint {
            observed_at: snapshot.observed_at,
            overall_sentiment: snapshot.overall_sentiment.clamp(0.0, 1.0),
        });
    }

    pub fn push(&mut self, point: HistoryPoint) {
        while self.points.len() >= self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    /// The last `k` points, oldest first. `k` is clamped to the current length.
    pub fn recent(&self, k: usize) -> Vec<HistoryPoint> {
        let skip = self.points.len().saturating_sub(k);
        self.points.iter().skip(skip).copied().collect()
    }

    /// All sentiment values, oldest first
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.overall_sentiment).collect()
    }

    pub fn points(&self) -> impl Iterator<Item = &HistoryPoint> {
        self.points.iter()
    }

    pub fn latest(&self) -> Option<&HistoryPoint> {
        self.points.back()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    fn snapshot(value: f64, minute: i64) -> SentimentSnapshot {
        SentimentSnapshot {
            overall_sentiment: value,
            positive_signals: Vec::new(),
            negative_signals: Vec::new(),
            analysis: String::new(),
            observed_at: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
                + TimeDelta::minutes(minute),
        }
    }

    #[test]
    fn test_append_and_recent() {
        let mut history = SentimentHistory::default();
        assert!(history.is_empty());

        for (i, v) in [0.4, 0.5, 0.6].into_iter().enumerate() {
            history.append(&snapshot(v, i as i64));
        }

        assert_eq!(history.len(), 3);
        let recent: Vec<f64> = history.recent(2).iter().map(|p| p.overall_sentiment).collect();
        assert_eq!(recent, vec![0.5, 0.6]);
        assert_eq!(history.recent(10).len(), 3);
        assert_eq!(history.latest().map(|p| p.overall_sentiment), Some(0.6));
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut history = SentimentHistory::default();
        for i in 0..12 {
            history.append(&snapshot(f64::from(i) / 20.0, i64::from(i)));
        }

        assert_eq!(history.len(), DEFAULT_HISTORY_CAPACITY);
        assert_eq!(history.values().first().copied(), Some(0.2));
        assert_eq!(history.values().last().copied(), Some(0.55));

        let times: Vec<_> = history.points().map(|p| p.observed_at).collect();
        assert!(times.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_custom_capacity() {
        let mut history = SentimentHistory::new(30);
        for i in 0..30 {
            history.append(&snapshot(0.5, i));
        }
        assert_eq!(history.len(), 30);
        assert_eq!(history.capacity(), 30);

        let zero = SentimentHistory::new(0);
        assert_eq!(zero.capacity(), 1);
    }

    #[test]
    fn test_append_clamps_values() {
        let mut history = SentimentHistory::default();
        history.append(&snapshot(1.7, 0));
        assert_eq!(history.values(), vec![1.0]);
    }
}
