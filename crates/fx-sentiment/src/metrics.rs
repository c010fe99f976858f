//! Sentiment-derived market indicators
//!
//! Every function here is pure. Indicators borrow their names from price-based
//! technical analysis but operate on signal confidences and the rolling
//! sentiment history, both in `[0, 1]`.
//!
//! The RSI and MACD readings need 14 and 26 history points respectively. With
//! the default history capacity of 8 they always report their neutral value.

use crate::history::SentimentHistory;
use crate::model::{
    Article, MacdSignal, MarketMetrics, MarketStructure, Momentum, PivotPoints, SentimentSnapshot,
    TradingVolume,
};

/// History points required before the RSI leaves 50
pub const RSI_MIN_POINTS: usize = 14;

/// History points required before the MACD leaves neutral
pub const MACD_MIN_POINTS: usize = 26;

const MACD_FAST: usize = 12;
const MACD_SLOW: usize = 26;
const MACD_SIGNAL: usize = 9;

const SUPPORT_FLOOR: f64 = 0.3;
const RESISTANCE_FLOOR: f64 = 0.7;

const VOLUME_KEYWORDS: [&str; 4] = ["volume", "trading", "liquidity", "flow"];

/// Compose the full indicator panel for one cycle
///
/// `history` must already contain the current snapshot's reading.
pub fn compute(
    snapshot: &SentimentSnapshot,
    history: &SentimentHistory,
    articles: &[Article],
) -> MarketMetrics {
    let values = history.values();
    let positive: Vec<f64> = snapshot.positive_signals.iter().map(|s| s.confidence).collect();
    let negative: Vec<f64> = snapshot.negative_signals.iter().map(|s| s.confidence).collect();
    let combined = snapshot.confidences();
    let (support_level, resistance_level) = support_resistance(&positive, &negative);

    MarketMetrics {
        volatility_index: volatility(&combined),
        trend_strength: trend_strength(snapshot.overall_sentiment, &values),
        support_level,
        resistance_level,
        trading_volume: trading_volume(articles),
        market_momentum: market_momentum(&values),
        rsi_value: rsi(&values),
        macd_signal: macd_signal(&values),
        pivot_points: pivot_points(&combined),
        atr_value: atr(&combined),
        market_structure: market_structure(&values),
    }
}

/// Population standard deviation of confidences ×100, capped at 100; 0 without signals
pub fn volatility(confidences: &[f64]) -> f64 {
    if confidences.is_empty() {
        return 0.0;
    }
    let n = confidences.len() as f64;
    let mean = confidences.iter().sum::<f64>() / n;
    let variance = confidences.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / n;
    (variance.sqrt() * 100.0).min(100.0)
}

/// 75 when the last three readings move with the current bias, 25 when not
pub fn trend_strength(current: f64, history: &[f64]) -> f64 {
    if history.len() < 2 {
        return 50.0;
    }
    let recent = last(history, 3);
    let monotonic = recent.windows(2).all(|w| {
        if current >= 0.5 {
            w[1] >= w[0]
        } else {
            w[1] <= w[0]
        }
    });
    if monotonic { 75.0 } else { 25.0 }
}

/// `(support, resistance)` on a 0-100 scale
pub fn support_resistance(positive: &[f64], negative: &[f64]) -> (f64, f64) {
    let support = positive.iter().copied().fold(SUPPORT_FLOOR, f64::min);
    let resistance = negative.iter().copied().fold(RESISTANCE_FLOOR, f64::max);
    (support * 100.0, resistance * 100.0)
}

/// Share of articles mentioning volume or flow
pub fn trading_volume(articles: &[Article]) -> TradingVolume {
    let score = if articles.is_empty() {
        0.0
    } else {
        let hits = articles
            .iter()
            .filter(|a| {
                let title = a.title.to_lowercase();
                let description = a.description.as_deref().unwrap_or("").to_lowercase();
                VOLUME_KEYWORDS
                    .iter()
                    .any(|k| title.contains(k) || description.contains(k))
            })
            .count();
        hits as f64 / articles.len() as f64 * 100.0
    };

    if score > 66.0 {
        TradingVolume::High
    } else if score > 33.0 {
        TradingVolume::Moderate
    } else {
        TradingVolume::Low
    }
}

/// Mean of the last three readings against the 0.6 / 0.4 bands
pub fn market_momentum(history: &[f64]) -> Momentum {
    if history.len() < 3 {
        return Momentum::Neutral;
    }
    let mean = last(history, 3).iter().sum::<f64>() / 3.0;
    if mean >= 0.6 {
        Momentum::Bullish
    } else if mean <= 0.4 {
        Momentum::Bearish
    } else {
        Momentum::Neutral
    }
}

/// RSI-like oscillator in `[0, 100]` over the whole history
///
/// Non-negative steps count as gains. An average loss of zero is treated as 1.
pub fn rsi(history: &[f64]) -> f64 {
    if history.len() < RSI_MIN_POINTS {
        return 50.0;
    }

    let steps = (history.len() - 1) as f64;
    let (gains, losses) = history.windows(2).fold((0.0, 0.0), |(g, l), w| {
        let diff = w[1] - w[0];
        if diff >= 0.0 { (g + diff, l) } else { (g, l - diff) }
    });

    let avg_gain = gains / steps;
    let avg_loss = losses / steps;
    let avg_loss = if avg_loss == 0.0 { 1.0 } else { avg_loss };

    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

/// Windowed EMA: `Σ value·k / period` over the last `period` values, `k = 2/(period+1)`
pub fn ema(values: &[f64], period: usize) -> f64 {
    if period == 0 {
        return 0.0;
    }
    let k = 2.0 / (period as f64 + 1.0);
    last(values, period).iter().map(|v| v * k).sum::<f64>() / period as f64
}

/// MACD line (EMA12 − EMA26) against the EMA9 signal line
pub fn macd_signal(history: &[f64]) -> MacdSignal {
    if history.len() < MACD_MIN_POINTS {
        return MacdSignal::Neutral;
    }

    let macd_line = ema(history, MACD_FAST) - ema(history, MACD_SLOW);
    let signal_line = ema(last(history, MACD_SIGNAL), MACD_SIGNAL);

    if macd_line > signal_line {
        MacdSignal::Buy
    } else if macd_line < signal_line {
        MacdSignal::Sell
    } else {
        MacdSignal::Neutral
    }
}

/// Classic pivot levels over confidences, with high/low/close = max/min/last
pub fn pivot_points(confidences: &[f64]) -> PivotPoints {
    let Some(&close) = confidences.last() else {
        return PivotPoints::default();
    };

    let high = confidences.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let low = confidences.iter().copied().fold(f64::INFINITY, f64::min);
    let pivot = (high + low + close) / 3.0;
    let unit = |v: f64| v.clamp(0.0, 1.0);

    PivotPoints {
        r3: unit(high + 2.0 * (pivot - low)),
        r2: unit(pivot + (high - low)),
        r1: unit(2.0 * pivot - low),
        pivot: unit(pivot),
        s1: unit(2.0 * pivot - high),
        s2: unit(pivot - (high - low)),
        s3: unit(low - 2.0 * (high - pivot)),
    }
}

/// Mean absolute step between consecutive confidences; 0 with fewer than two
pub fn atr(confidences: &[f64]) -> f64 {
    if confidences.len() < 2 {
        return 0.0;
    }
    let total: f64 = confidences.windows(2).map(|w| (w[1] - w[0]).abs()).sum();
    total / (confidences.len() - 1) as f64
}

/// Swing comparison over the last four readings
pub fn market_structure(history: &[f64]) -> MarketStructure {
    let [a, b, c, d] = match last(history, 4) {
        &[a, b, c, d] => [a, b, c, d],
        _ => return MarketStructure::Ranging,
    };

    let higher_highs = b > a && d > c;
    let higher_lows = c > a;
    let lower_lows = b < a && d < c;
    let lower_highs = c < a;

    if higher_highs && higher_lows {
        MarketStructure::Uptrend
    } else if lower_lows && lower_highs {
        MarketStructure::Downtrend
    } else {
        MarketStructure::Ranging
    }
}

fn last(values: &[f64], n: usize) -> &[f64] {
    &values[values.len().saturating_sub(n)..]
}
