//! End-to-end refresh cycles against scripted collaborators

use async_trait::async_trait;
use chrono::{TimeDelta, TimeZone, Utc};
use fx_llm::{CompletionRequest, CompletionResponse, LLMProvider, Message, StopReason, TokenUsage};
use fx_sentiment::{
    CycleState, ManualClock, MarketStructure, MonitorConfig, NewsCategory, NewsFetcher,
    NewsProvider, Orchestrator, RawArticle, RawNewsPage, SentimentAnalyzer, SentimentError,
    TradingVolume, analyze_pairs,
};
use mockall::mock;
use std::sync::Arc;

mock! {
    News {}

    #[async_trait]
    impl NewsProvider for News {
        async fn latest(&self) -> fx_sentiment::Result<RawNewsPage>;
        async fn page(&self, token: &str) -> fx_sentiment::Result<RawNewsPage>;
    }
}

mock! {
    Llm {}

    #[async_trait]
    impl LLMProvider for Llm {
        async fn complete(&self, request: CompletionRequest) -> fx_llm::Result<CompletionResponse>;
        fn name(&self) -> &str;
    }
}

fn reply(text: String) -> CompletionResponse {
    CompletionResponse {
        message: Message::assistant(text),
        stop_reason: StopReason::EndTurn,
        usage: TokenUsage::default(),
    }
}

fn sentiment_reply(overall: f64) -> CompletionResponse {
    reply(format!(
        "SENTIMENT: {overall}\n\
         POSITIVE SIGNAL: Strong USD demand | CONFIDENCE: 80\n\
         NEGATIVE SIGNAL: Eurozone slowdown | CONFIDENCE: 60\n\
         ANALYSIS: Markets lean on dollar strength."
    ))
}

fn raw(title: &str, description: &str) -> RawArticle {
    RawArticle {
        title: Some(title.to_string()),
        description: Some(description.to_string()),
        content: None,
        source_id: Some("reuters".to_string()),
        pub_date: Some("2024-03-01 11:45:00".to_string()),
        link: Some("https://example.com/story".to_string()),
    }
}

fn page() -> RawNewsPage {
    RawNewsPage {
        articles: vec![
            raw("EUR/USD slips as trading volume climbs", "Dollar gains on data"),
            raw("Liquidity thins ahead of payrolls", "Markets weak into the weekend"),
            raw("USD/JPY steady", "BoJ holds policy"),
        ],
        next_page: Some("page-2".to_string()),
    }
}

fn clock() -> ManualClock {
    ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap())
}

#[tokio::test]
async fn history_drives_market_structure_across_cycles() {
    let config = MonitorConfig::default();
    let clock = clock();

    let mut news = MockNews::new();
    news.expect_latest().times(4).returning(|| Ok(page()));

    let mut readings = vec![0.4, 0.5, 0.45, 0.6].into_iter();
    let mut llm = MockLlm::new();
    llm.expect_complete()
        .times(4)
        .returning(move |_| Ok(sentiment_reply(readings.next().unwrap_or(0.5))));

    let fetcher = NewsFetcher::with_clock(Arc::new(news), &config, Arc::new(clock.clone()));
    let analyzer = SentimentAnalyzer::new(Arc::new(llm), &config).unwrap();
    let mut orchestrator = Orchestrator::new(fetcher, analyzer, &config);
    let updates = orchestrator.subscribe();

    let mut last = None;
    for _ in 0..4 {
        last = Some(orchestrator.run_cycle().await.unwrap());
        // past the cache TTL, inside the same hour bucket
        clock.advance(TimeDelta::minutes(6));
    }

    let metrics = last.unwrap();
    assert_eq!(metrics.market_structure, MarketStructure::Uptrend);
    assert_eq!(metrics.trading_volume, TradingVolume::High);
    assert_eq!(metrics.rsi_value, 50.0);
    assert_eq!(metrics.support_level, 30.0);
    assert_eq!(metrics.resistance_level, 70.0);

    let state = updates.borrow().clone();
    assert_eq!(state.state, CycleState::Idle);
    assert_eq!(state.cycles_completed, 4);
    assert_eq!(state.history.len(), 4);
    assert_eq!(state.articles.len(), 3);
}

#[tokio::test]
async fn rate_limited_provider_falls_back_to_stale_bucket() {
    let config = MonitorConfig::default();
    let clock = clock();

    let mut calls = 0;
    let mut news = MockNews::new();
    news.expect_latest().times(2).returning(move || {
        calls += 1;
        if calls == 1 {
            Ok(page())
        } else {
            Err(SentimentError::RateLimitExceeded {
                provider: "newsdata.io".to_string(),
            })
        }
    });

    let mut llm = MockLlm::new();
    llm.expect_complete()
        .times(2)
        .returning(|_| Ok(sentiment_reply(0.7)));

    let fetcher = NewsFetcher::with_clock(Arc::new(news), &config, Arc::new(clock.clone()));
    let analyzer = SentimentAnalyzer::new(Arc::new(llm), &config).unwrap();
    let mut orchestrator = Orchestrator::new(fetcher, analyzer, &config);

    orchestrator.run_cycle().await.unwrap();
    clock.advance(TimeDelta::minutes(10));
    orchestrator.run_cycle().await.unwrap();

    let state = orchestrator.state();
    assert_eq!(state.cycles_completed, 2);
    assert_eq!(state.articles.len(), 3);
}

#[tokio::test]
async fn pagination_and_pair_breakdown() {
    let config = MonitorConfig::default();

    let mut news = MockNews::new();
    news.expect_latest().times(1).returning(|| Ok(page()));
    news.expect_page()
        .withf(|token| token == "page-2")
        .times(1)
        .returning(|_| {
            Ok(RawNewsPage {
                articles: vec![raw("GBP/USD rallies", "Sterling strong")],
                next_page: None,
            })
        });

    let mut llm = MockLlm::new();
    llm.expect_complete()
        .times(3)
        .returning(|_| Ok(sentiment_reply(0.65)));

    let fetcher = NewsFetcher::with_clock(Arc::new(news), &config, Arc::new(clock()));
    let analyzer = SentimentAnalyzer::new(Arc::new(llm), &config).unwrap();

    let first = fetcher.fetch(&NewsCategory::AllNews).await.unwrap();
    let token = first.next_page.clone().unwrap();
    let second = fetcher.next_page(&token).await.unwrap();
    assert!(second.next_page.is_none());

    let mut articles = first.articles;
    articles.extend(second.articles);

    let results = analyze_pairs(&analyzer, &articles, &config.currency_pairs)
        .await
        .unwrap();

    let covered: Vec<&str> = results
        .iter()
        .filter(|p| p.article_count > 0)
        .map(|p| p.pair.as_str())
        .collect();
    assert_eq!(covered, vec!["EUR/USD", "GBP/USD", "USD/JPY"]);

    let aud = results.iter().find(|p| p.pair == "AUD/USD").unwrap();
    assert_eq!((aud.positive, aud.negative, aud.neutral), (0, 0, 0));
    assert_eq!(aud.overall_sentiment, 0.5);

    let eur = results.iter().find(|p| p.pair == "EUR/USD").unwrap();
    assert_eq!((eur.positive, eur.negative, eur.neutral), (50, 50, 0));
}

#[tokio::test]
async fn missing_credentials_are_fatal() {
    let result = Orchestrator::from_config(&MonitorConfig::default());
    assert!(matches!(result, Err(SentimentError::ConfigError(_))));
}
