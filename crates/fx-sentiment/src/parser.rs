//! Parser for the sentiment service's free-text reply
//!
//! The reply is tokenized line by line into [`LineToken`]s which a reducer folds
//! into a [`SentimentSnapshot`]. Unknown lines are ignored; the parser is strict
//! only about the `SENTIMENT:` line and about confidence fields on signal lines.

use crate::error::{Result, SentimentError};
use crate::model::{Polarity, SentimentSignal, SentimentSnapshot};
use chrono::{DateTime, Utc};
use regex::Regex;

const SENTIMENT_LABEL: &str = "sentiment:";
const POSITIVE_LABEL: &str = "positive signal:";
const NEGATIVE_LABEL: &str = "negative signal:";
const ANALYSIS_LABEL: &str = "analysis:";

/// Leading decimal number, like JavaScript's `parseFloat`
const NUMBER_PATTERN: &str = r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?";

/// One classified line of the reply
#[derive(Debug, Clone, PartialEq)]
pub enum LineToken {
    /// `SENTIMENT:` with its value, if one could be read
    Sentiment(Option<f64>),
    /// `POSITIVE SIGNAL:` or `NEGATIVE SIGNAL:`; confidence is on the 0-100 scale
    Signal {
        polarity: Polarity,
        title: String,
        confidence: Option<f64>,
    },
    Analysis(String),
    Other,
}

/// Tokenizer and reducer for sentiment replies
#[derive(Debug, Clone)]
pub struct SentimentResponseParser {
    number: Regex,
}

impl SentimentResponseParser {
    pub fn new() -> Result<Self> {
        let number = Regex::new(NUMBER_PATTERN)
            .map_err(|e| SentimentError::ConfigError(format!("Invalid number pattern: {e}")))?;
        Ok(Self { number })
    }

    /// Classify a single line
    pub fn tokenize_line(&self, line: &str) -> LineToken {
        let line = line.trim();

        if let Some(rest) = strip_label(line, SENTIMENT_LABEL) {
            return LineToken::Sentiment(self.leading_number(rest));
        }

        for (label, polarity) in [
            (POSITIVE_LABEL, Polarity::Positive),
            (NEGATIVE_LABEL, Polarity::Negative),
        ] {
            if let Some(rest) = strip_label(line, label) {
                let (title, confidence) = match rest.split_once('|') {
                    Some((title, tail)) => {
                        let value = tail.split_once(':').map_or(tail, |(_, v)| v);
                        (title, self.leading_number(value))
                    }
                    None => (rest, None),
                };
                return LineToken::Signal {
                    polarity,
                    title: title.trim().to_string(),
                    confidence,
                };
            }
        }

        if let Some(rest) = strip_label(line, ANALYSIS_LABEL) {
            return LineToken::Analysis(rest.trim().to_string());
        }

        LineToken::Other
    }

    /// Parse a full reply, stamping signals and the snapshot with the current time
    pub fn parse(&self, raw: &str) -> Result<SentimentSnapshot> {
        self.parse_at(raw, Utc::now())
    }

    /// Parse a full reply observed at `now`
    pub fn parse_at(&self, raw: &str, now: DateTime<Utc>) -> Result<SentimentSnapshot> {
        let mut saw_sentiment = false;
        let mut snapshot = SentimentSnapshot {
            overall_sentiment: 0.5,
            positive_signals: Vec::new(),
            negative_signals: Vec::new(),
            analysis: String::new(),
            observed_at: now,
        };

        for (lineno, line) in raw.lines().enumerate() {
            match self.tokenize_line(line) {
                LineToken::Sentiment(value) => {
                    saw_sentiment = true;
                    if let Some(value) = value {
                        snapshot.overall_sentiment = normalize_sentiment(value);
                    }
                }
                LineToken::Signal {
                    polarity,
                    title,
                    confidence,
                } => {
                    let confidence = confidence.ok_or_else(|| {
                        SentimentError::MalformedResponse(format!(
                            "signal on line {} has no confidence: {}",
                            lineno + 1,
                            line.trim()
                        ))
                    })?;
                    let signal = SentimentSignal {
                        title,
                        confidence: (confidence / 100.0).clamp(0.0, 1.0),
                        polarity,
                        extracted_at: now,
                    };
                    match polarity {
                        Polarity::Positive => snapshot.positive_signals.push(signal),
                        Polarity::Negative => snapshot.negative_signals.push(signal),
                    }
                }
                LineToken::Analysis(text) => snapshot.analysis = text,
                LineToken::Other => {}
            }
        }

        if !saw_sentiment {
            return Err(SentimentError::MalformedResponse(
                "response has no SENTIMENT line".to_string(),
            ));
        }

        Ok(snapshot)
    }

    fn leading_number(&self, text: &str) -> Option<f64> {
        self.number
            .find(text.trim_start())
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .filter(|v| v.is_finite())
    }
}

/// Values above 1 are read as percentages
fn normalize_sentiment(value: f64) -> f64 {
    let value = if value > 1.0 { value / 100.0 } else { value };
    value.clamp(0.0, 1.0)
}

/// `line` without a case-insensitive ASCII `label` prefix
fn strip_label<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let head = line.get(..label.len())?;
    head.eq_ignore_ascii_case(label).then(|| &line[label.len()..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn parser() -> SentimentResponseParser {
        SentimentResponseParser::new().unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_documented_reply_round_trip() {
        let raw = "SENTIMENT: 72\n\
                   POSITIVE SIGNAL: Strong USD demand | CONFIDENCE: 80\n\
                   NEGATIVE SIGNAL: Eurozone slowdown | CONFIDENCE: 60\n\
                   ANALYSIS: Markets lean bullish on dollar strength.";
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();

        let snapshot = parser().parse_at(raw, now).unwrap();

        assert!(approx(snapshot.overall_sentiment, 0.72));
        assert_eq!(snapshot.positive_signals.len(), 1);
        assert_eq!(snapshot.positive_signals[0].title, "Strong USD demand");
        assert!(approx(snapshot.positive_signals[0].confidence, 0.8));
        assert_eq!(snapshot.positive_signals[0].extracted_at, now);
        assert_eq!(snapshot.negative_signals.len(), 1);
        assert_eq!(snapshot.negative_signals[0].title, "Eurozone slowdown");
        assert!(approx(snapshot.negative_signals[0].confidence, 0.6));
        assert_eq!(snapshot.analysis, "Markets lean bullish on dollar strength.");
        assert_eq!(snapshot.observed_at, now);
    }

    #[test]
    fn test_fractional_sentiment_kept() {
        let snapshot = parser().parse("SENTIMENT: 0.35").unwrap();
        assert!(approx(snapshot.overall_sentiment, 0.35));
    }

    #[test]
    fn test_confidences_are_clamped() {
        let raw = "SENTIMENT: 0.5\n\
                   POSITIVE SIGNAL: Overconfident | CONFIDENCE: 150\n\
                   NEGATIVE SIGNAL: Underwater | CONFIDENCE: -20";
        let snapshot = parser().parse(raw).unwrap();

        assert!(approx(snapshot.positive_signals[0].confidence, 1.0));
        assert!(approx(snapshot.negative_signals[0].confidence, 0.0));
        assert!(snapshot.confidences().iter().all(|c| (0.0..=1.0).contains(c)));
    }

    #[test]
    fn test_sentiment_is_clamped() {
        assert!(approx(parser().parse("SENTIMENT: 250").unwrap().overall_sentiment, 1.0));
        assert!(approx(parser().parse("SENTIMENT: -3").unwrap().overall_sentiment, 0.0));
    }

    #[test]
    fn test_missing_sentiment_line_fails() {
        let result = parser().parse("ANALYSIS: nothing to see");
        assert!(matches!(result, Err(SentimentError::MalformedResponse(_))));
    }

    #[test]
    fn test_signal_without_confidence_fails() {
        let raw = "SENTIMENT: 0.6\nPOSITIVE SIGNAL: Rate hike expectations";
        assert!(matches!(
            parser().parse(raw),
            Err(SentimentError::MalformedResponse(_))
        ));

        let raw = "SENTIMENT: 0.6\nNEGATIVE SIGNAL: Trade deficit | CONFIDENCE: high";
        assert!(matches!(
            parser().parse(raw),
            Err(SentimentError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_unparsable_sentiment_keeps_default() {
        let snapshot = parser().parse("SENTIMENT: unclear").unwrap();
        assert!(approx(snapshot.overall_sentiment, 0.5));
        assert!(snapshot.positive_signals.is_empty());
        assert!(snapshot.analysis.is_empty());
    }

    #[test]
    fn test_labels_are_case_insensitive_and_extra_lines_ignored() {
        let raw = "Here is my analysis:\n\
                   \n\
                   sentiment: 0.4\n\
                   Positive Signal: Exports recover | Confidence: 55\n\
                   Note: data is preliminary\n\
                   analysis:   Mixed picture overall.  ";
        let snapshot = parser().parse(raw).unwrap();

        assert!(approx(snapshot.overall_sentiment, 0.4));
        assert_eq!(snapshot.positive_signals[0].title, "Exports recover");
        assert!(approx(snapshot.positive_signals[0].confidence, 0.55));
        assert_eq!(snapshot.analysis, "Mixed picture overall.");
    }

    #[test]
    fn test_tokenize_line_kinds() {
        let p = parser();
        assert_eq!(p.tokenize_line("  SENTIMENT: 0.9 "), LineToken::Sentiment(Some(0.9)));
        assert_eq!(
            p.tokenize_line("NEGATIVE SIGNAL: Oil shock | CONFIDENCE: 70%"),
            LineToken::Signal {
                polarity: Polarity::Negative,
                title: "Oil shock".to_string(),
                confidence: Some(70.0),
            }
        );
        assert_eq!(
            p.tokenize_line("ANALYSIS: Calm."),
            LineToken::Analysis("Calm.".to_string())
        );
        assert_eq!(p.tokenize_line("SENTIMENTAL value"), LineToken::Other);
        assert_eq!(p.tokenize_line("ünïcode line"), LineToken::Other);
    }
}
