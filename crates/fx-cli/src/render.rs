//! Terminal tables for dashboard state, news and pair breakdowns

use chrono::{DateTime, Utc};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use fx_sentiment::{
    Article, DashboardState, MarketMetrics, PairSentiment, SentimentDistribution,
    SentimentSnapshot,
};

const TITLE_WIDTH: usize = 72;

fn table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Shorten `text` to at most `max` characters, marking the cut with `...`
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

fn timestamp(at: Option<DateTime<Utc>>) -> String {
    at.map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
}

fn percent(value: f64) -> String {
    format!("{:.0}%", value * 100.0)
}

pub fn status_table(state: &DashboardState) -> Table {
    let mut table = table();
    table.set_header(vec!["Status", "Value"]);
    table.add_row(vec!["Cycle".to_string(), state.state.to_string()]);
    table.add_row(vec!["Last updated".to_string(), timestamp(state.last_updated)]);
    table.add_row(vec![
        "Cycles completed".to_string(),
        state.cycles_completed.to_string(),
    ]);
    table.add_row(vec!["Articles".to_string(), state.articles.len().to_string()]);

    if let Some(snapshot) = &state.snapshot {
        table.add_row(vec![
            "Overall sentiment".to_string(),
            format!("{} ({})", percent(snapshot.overall_sentiment), snapshot.label().as_str()),
        ]);
    }
    if !state.history.is_empty() {
        let trail: Vec<String> = state
            .history
            .iter()
            .map(|p| format!("{:.2}", p.overall_sentiment))
            .collect();
        table.add_row(vec!["History".to_string(), trail.join(" → ")]);
    }
    if let Some(error) = &state.last_error {
        table.add_row(vec!["Last error".to_string(), error.clone()]);
    }
    table
}

pub fn metrics_table(metrics: &MarketMetrics) -> Table {
    let mut table = table();
    table.set_header(vec!["Indicator", "Value"]);

    let pivots = &metrics.pivot_points;
    let rows = [
        ("Volatility index", format!("{:.1}", metrics.volatility_index)),
        ("Trend strength", format!("{:.0}", metrics.trend_strength)),
        ("Support", format!("{:.1}", metrics.support_level)),
        ("Resistance", format!("{:.1}", metrics.resistance_level)),
        ("Trading volume", metrics.trading_volume.to_string()),
        ("Momentum", metrics.market_momentum.to_string()),
        ("RSI", format!("{:.1}", metrics.rsi_value)),
        ("MACD", metrics.macd_signal.to_string()),
        (
            "Pivot (R3 R2 R1 P S1 S2 S3)",
            pivots
                .levels()
                .iter()
                .map(|l| format!("{l:.3}"))
                .collect::<Vec<_>>()
                .join(" "),
        ),
        ("ATR", format!("{:.4}", metrics.atr_value)),
        ("Market structure", metrics.market_structure.to_string()),
    ];
    for (name, value) in rows {
        table.add_row(vec![name.to_string(), value]);
    }
    table
}

pub fn signals_table(snapshot: &SentimentSnapshot) -> Table {
    let mut table = table();
    table.set_header(vec!["Signal", "Polarity", "Confidence"]);
    for signal in snapshot.signals() {
        table.add_row(vec![
            truncate(&signal.title, TITLE_WIDTH),
            format!("{:?}", signal.polarity),
            percent(signal.confidence),
        ]);
    }
    table
}

pub fn articles_table(articles: &[Article]) -> Table {
    let mut table = table();
    table.set_header(vec!["#", "Title", "Source", "Published", "Heuristic"]);
    for (index, article) in articles.iter().enumerate() {
        table.add_row(vec![
            (index + 1).to_string(),
            truncate(&article.title, TITLE_WIDTH),
            article.source_id.clone(),
            timestamp(article.published_at),
            format!("{:.2}", article.heuristic_sentiment),
        ]);
    }
    table
}

pub fn pairs_table(pairs: &[PairSentiment]) -> Table {
    let mut table = table();
    table.set_header(vec!["Pair", "Articles", "Positive", "Negative", "Neutral", "Overall"]);
    for pair in pairs {
        table.add_row(vec![
            pair.pair.clone(),
            pair.article_count.to_string(),
            format!("{}%", pair.positive),
            format!("{}%", pair.negative),
            format!("{}%", pair.neutral),
            format!("{} ({})", percent(pair.overall_sentiment), pair.label().as_str()),
        ]);
    }
    table
}

pub fn distribution_table(distribution: &SentimentDistribution) -> Table {
    let mut table = table();
    table.set_header(vec!["Band", "Share of pairs"]);
    for (label, share) in distribution.rows() {
        table.add_row(vec![label.as_str().to_string(), format!("{share}%")]);
    }
    table
}

/// Everything `watch` and `once` print for one published state
pub fn dashboard(state: &DashboardState) -> String {
    let mut out = status_table(state).to_string();
    if let Some(metrics) = &state.metrics {
        out.push('\n');
        out.push_str(&metrics_table(metrics).to_string());
    }
    if let Some(snapshot) = &state.snapshot {
        if snapshot.signals().next().is_some() {
            out.push('\n');
            out.push_str(&signals_table(snapshot).to_string());
        }
        if !snapshot.analysis.is_empty() {
            out.push_str(&format!("\n{}\n", snapshot.analysis));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use fx_sentiment::{MacdSignal, MarketStructure, Momentum, PivotPoints, TradingVolume};

    fn metrics() -> MarketMetrics {
        MarketMetrics {
            volatility_index: 12.5,
            trend_strength: 75.0,
            support_level: 30.0,
            resistance_level: 70.0,
            trading_volume: TradingVolume::High,
            market_momentum: Momentum::Bullish,
            rsi_value: 50.0,
            macd_signal: MacdSignal::Neutral,
            pivot_points: PivotPoints::default(),
            atr_value: 0.1,
            market_structure: MarketStructure::Uptrend,
        }
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly10!", 10), "exactly10!");
        assert_eq!(truncate("a much longer headline", 10), "a much ...");
        assert_eq!(truncate("€€€€€€", 5), "€€...");
    }

    #[test]
    fn test_metrics_table_lists_every_indicator() {
        let rendered = metrics_table(&metrics()).to_string();
        for name in ["Volatility index", "RSI", "MACD", "ATR", "Market structure"] {
            assert!(rendered.contains(name), "missing {name}");
        }
        assert!(rendered.contains("uptrend"));
    }

    #[test]
    fn test_dashboard_without_data_shows_status_only() {
        let state = DashboardState {
            last_error: Some("News API rate limit exceeded".to_string()),
            ..DashboardState::default()
        };
        let rendered = dashboard(&state);
        assert!(rendered.contains("Idle"));
        assert!(rendered.contains("rate limit"));
        assert!(!rendered.contains("Indicator"));
    }

    #[test]
    fn test_pairs_and_distribution_tables() {
        let pairs = vec![PairSentiment::without_coverage("AUD/USD")];
        let rendered = pairs_table(&pairs).to_string();
        assert!(rendered.contains("AUD/USD"));
        assert!(rendered.contains("50%"));

        let distribution = SentimentDistribution::from_pairs(&pairs);
        assert!(distribution_table(&distribution).to_string().contains("100%"));
    }
}
