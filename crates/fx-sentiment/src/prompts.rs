//! Prompts for the sentiment service

use crate::error::Result;
use crate::model::Article;
use minijinja::{Environment, context};
use serde::Serialize;

/// Analyst persona sent as the system message
pub const SYSTEM_PROMPT: &str = "You are an expert financial analyst specializing in forex markets. \
Analyze news articles and provide detailed market sentiment analysis. \
Always format your response exactly as specified.";

const USER_TEMPLATE: &str = r#"Analyze these financial news articles for forex market sentiment:
{% for article in articles %}
[Article {{ article.index }}]
Title: {{ article.title }}
Content: {{ article.body }}
Source: {{ article.source }}
Date: {{ article.date }}
---{% endfor %}

Provide your analysis in exactly this format:
SENTIMENT: [a number between 0 and 1]
POSITIVE SIGNAL: [description] | CONFIDENCE: [number between 1-100]
POSITIVE SIGNAL: [description] | CONFIDENCE: [number between 1-100]
NEGATIVE SIGNAL: [description] | CONFIDENCE: [number between 1-100]
NEGATIVE SIGNAL: [description] | CONFIDENCE: [number between 1-100]
ANALYSIS: [2-3 sentence market analysis]"#;

#[derive(Debug, Serialize)]
struct DigestEntry<'a> {
    index: usize,
    title: &'a str,
    body: &'a str,
    source: &'a str,
    date: String,
}

/// Render the user message: a numbered article digest followed by the reply template
pub fn render_sentiment_prompt(articles: &[Article]) -> Result<String> {
    let entries: Vec<DigestEntry<'_>> = articles
        .iter()
        .enumerate()
        .map(|(idx, article)| DigestEntry {
            index: idx + 1,
            title: &article.title,
            body: article.body(),
            source: &article.source_id,
            date: article
                .published_at
                .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "unknown".to_string()),
        })
        .collect();

    let env = Environment::new();
    let rendered = env.render_str(USER_TEMPLATE, context! { articles => entries })?;
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn article(title: &str, description: Option<&str>) -> Article {
        Article {
            title: title.to_string(),
            description: description.map(str::to_string),
            content: None,
            source_id: "bloomberg".to_string(),
            published_at: Some(Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()),
            link: String::new(),
            heuristic_sentiment: 0.5,
        }
    }

    #[test]
    fn test_prompt_contains_digest_and_template() {
        let prompt = render_sentiment_prompt(&[
            article("Fed holds rates", Some("Policy unchanged")),
            article("ECB signals cut", None),
        ])
        .unwrap();

        assert!(prompt.starts_with("Analyze these financial news articles for forex market sentiment:"));
        assert!(prompt.contains("[Article 1]\nTitle: Fed holds rates\nContent: Policy unchanged"));
        assert!(prompt.contains("[Article 2]\nTitle: ECB signals cut\nContent: No content available"));
        assert!(prompt.contains("Source: bloomberg\nDate: 2024-03-01 09:30:00\n---"));
        assert!(prompt.ends_with("ANALYSIS: [2-3 sentence market analysis]"));
    }

    #[test]
    fn test_prompt_keeps_template_lines_in_order() {
        let prompt = render_sentiment_prompt(&[article("Dollar firm", None)]).unwrap();
        let template: Vec<&str> = prompt
            .lines()
            .skip_while(|l| !l.starts_with("SENTIMENT:"))
            .collect();

        assert_eq!(template.len(), 6);
        assert!(template[1].starts_with("POSITIVE SIGNAL:"));
        assert!(template[3].starts_with("NEGATIVE SIGNAL:"));
        assert!(template[5].starts_with("ANALYSIS:"));
    }

    #[test]
    fn test_system_prompt_persona() {
        assert!(SYSTEM_PROMPT.contains("forex markets"));
        assert!(SYSTEM_PROMPT.ends_with("exactly as specified."));
    }
}
