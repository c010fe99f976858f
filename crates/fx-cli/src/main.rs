//! Forex sentiment monitor CLI
//!
//! # Usage
//!
//! ```bash
//! export NEWSDATA_API_KEY="..."
//! export GROQ_API_KEY="..."
//!
//! # Live dashboard, refreshed every five minutes; type `r` + Enter to refresh now
//! cargo run --bin fx-monitor -- watch
//!
//! # One cycle, machine readable
//! cargo run --bin fx-monitor -- --json once --search "federal reserve"
//! ```

mod render;

use anyhow::Context;
use clap::{Parser, Subcommand};
use fx_sentiment::{
    DashboardState, MonitorConfig, NewsCategory, NewsFetcher, Orchestrator, SentimentAnalyzer,
    SentimentDistribution, TriggerOutcome, analyze_pairs,
};
use serde::Serialize;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "fx-monitor")]
#[command(about = "Forex news sentiment monitor", long_about = None)]
struct Cli {
    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the refresh loop and redraw after every cycle
    Watch {
        /// Only analyze articles whose title or description contain this term
        #[arg(long)]
        search: Option<String>,
        /// Seconds between scheduled refreshes
        #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
        interval: Option<u64>,
    },
    /// Run a single refresh cycle and print the result
    Once {
        #[arg(long)]
        search: Option<String>,
    },
    /// List the current news batch
    News {
        #[arg(long)]
        search: Option<String>,
        /// Continue from a `nextPage` token printed by a previous call
        #[arg(long)]
        page: Option<String>,
    },
    /// Per-currency-pair sentiment breakdown
    Pairs {
        /// Comma separated pairs, e.g. EUR/USD,USD/JPY
        #[arg(long, value_delimiter = ',')]
        pairs: Vec<String>,
    },
}

fn category(search: Option<String>) -> NewsCategory {
    search.map_or(NewsCategory::AllNews, NewsCategory::search)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_state(state: &DashboardState, json: bool) -> anyhow::Result<()> {
    if json {
        print_json(state)
    } else {
        println!("{}", render::dashboard(state));
        Ok(())
    }
}

async fn watch(config: &MonitorConfig, category: NewsCategory, json: bool) -> anyhow::Result<()> {
    let handle = Orchestrator::from_config(config)?
        .with_category(category)
        .spawn();
    let mut updates = handle.subscribe();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    if !json {
        println!("Watching news sentiment. Type `r` + Enter to refresh, Ctrl-C to quit.");
    }

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("Interrupted, shutting down");
                break;
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                if state.state.is_running() {
                    if !json {
                        println!("… {}", state.state);
                    }
                    continue;
                }
                print_state(&state, json)?;
            }
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(input)) if input.trim().eq_ignore_ascii_case("r") => {
                    match handle.trigger() {
                        TriggerOutcome::Queued => info!("Manual refresh queued"),
                        TriggerOutcome::AlreadyQueued => info!("A refresh is already queued"),
                        TriggerOutcome::Stopped => break,
                    }
                }
                Ok(Some(_)) => {}
                Ok(None) => stdin_open = false,
                Err(err) => {
                    warn!("Stopped reading stdin: {}", err);
                    stdin_open = false;
                }
            },
        }
    }

    handle.shutdown().await;
    Ok(())
}

async fn once(config: &MonitorConfig, category: NewsCategory, json: bool) -> anyhow::Result<()> {
    let mut orchestrator = Orchestrator::from_config(config)?.with_category(category);
    orchestrator
        .run_cycle()
        .await
        .context("Refresh cycle failed")?;
    print_state(&orchestrator.state(), json)
}

async fn news(
    config: &MonitorConfig,
    category: NewsCategory,
    page: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let fetcher = NewsFetcher::from_config(config)?;
    let batch = match page {
        Some(token) => fetcher.next_page(&token).await?,
        None => fetcher.refresh(&category).await?,
    };

    if json {
        return print_json(&batch);
    }

    println!("{}", render::articles_table(&batch.articles));
    if let Some(token) = &batch.next_page {
        println!("Next page: --page {token}");
    }
    Ok(())
}

#[derive(Serialize)]
struct PairsReport {
    pairs: Vec<fx_sentiment::PairSentiment>,
    distribution: SentimentDistribution,
}

async fn pairs(config: &MonitorConfig, json: bool) -> anyhow::Result<()> {
    let fetcher = NewsFetcher::from_config(config)?;
    let analyzer = SentimentAnalyzer::from_config(config)?;

    let batch = fetcher.refresh(&NewsCategory::AllNews).await?;
    let pairs = analyze_pairs(&analyzer, &batch.articles, &config.currency_pairs).await?;
    let report = PairsReport {
        distribution: SentimentDistribution::from_pairs(&pairs),
        pairs,
    };

    if json {
        return print_json(&report);
    }

    println!("{}", render::pairs_table(&report.pairs));
    println!("{}", render::distribution_table(&report.distribution));
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fx_utils::init_tracing_with(&fx_utils::Config::from_env());

    let cli = Cli::parse();

    let mut builder = MonitorConfig::builder().with_env_keys();
    match &cli.command {
        Command::Watch {
            interval: Some(secs),
            ..
        } => builder = builder.refresh_interval(Duration::from_secs(*secs)),
        Command::Pairs { pairs } if !pairs.is_empty() => {
            builder = builder.currency_pairs(pairs.clone());
        }
        _ => {}
    }
    let config = builder.build()?;

    info!("Starting fx-monitor");

    match cli.command {
        Command::Watch { search, .. } => watch(&config, category(search), cli.json).await,
        Command::Once { search } => once(&config, category(search), cli.json).await,
        Command::News { search, page } => news(&config, category(search), page, cli.json).await,
        Command::Pairs { .. } => pairs(&config, cli.json).await,
    }
}
