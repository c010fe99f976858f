//! Refresh loop: fetch, analyze, record, derive
//!
//! One cycle runs at a time. Manual triggers are coalesced into a queue of
//! depth one: a trigger that arrives mid-cycle runs right after it, and any
//! further triggers before that are dropped. Timer ticks missed during a long
//! cycle are skipped.

use crate::analyzer::SentimentAnalyzer;
use crate::config::MonitorConfig;
use crate::error::{Result, SentimentError};
use crate::history::{HistoryPoint, SentimentHistory};
use crate::metrics;
use crate::model::{Article, MarketMetrics, SentimentSnapshot};
use crate::news::{NewsCategory, NewsFetcher};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Stage of the current refresh cycle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum CycleState {
    #[default]
    Idle,
    Fetching,
    Analyzing,
    Updating,
    Failed {
        message: String,
    },
}

impl CycleState {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Fetching | Self::Analyzing | Self::Updating)
    }
}

impl fmt::Display for CycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Fetching => write!(f, "Fetching news"),
            Self::Analyzing => write!(f, "Analyzing sentiment"),
            Self::Updating => write!(f, "Updating metrics"),
            Self::Failed { message } => write!(f, "Failed: {message}"),
        }
    }
}

/// Everything the presentation layer needs, published after every change
///
/// Snapshot and metrics always come from the last successful cycle, so a
/// failed cycle leaves them in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardState {
    pub state: CycleState,
    pub snapshot: Option<SentimentSnapshot>,
    pub metrics: Option<MarketMetrics>,
    pub articles: Vec<Article>,
    pub history: Vec<HistoryPoint>,
    pub last_error: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
    pub cycles_completed: u64,
}

impl DashboardState {
    /// Whether a successful cycle has produced data yet
    pub fn has_data(&self) -> bool {
        self.metrics.is_some()
    }
}

/// Result of [`OrchestratorHandle::trigger`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// A refresh will run as soon as the loop is free
    Queued,
    /// A refresh was already pending; this one was dropped
    AlreadyQueued,
    /// The loop has shut down
    Stopped,
}

/// Shortest period the refresh timer accepts
const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// Sequences fetcher, analyzer, history and metrics
pub struct Orchestrator {
    fetcher: NewsFetcher,
    analyzer: SentimentAnalyzer,
    history: SentimentHistory,
    category: NewsCategory,
    refresh_interval: Duration,
    state_tx: watch::Sender<DashboardState>,
}

impl Orchestrator {
    pub fn new(fetcher: NewsFetcher, analyzer: SentimentAnalyzer, config: &MonitorConfig) -> Self {
        let (state_tx, _) = watch::channel(DashboardState::default());
        Self {
            fetcher,
            analyzer,
            history: SentimentHistory::new(config.history_capacity),
            category: NewsCategory::AllNews,
            refresh_interval: config.refresh_interval.max(MIN_REFRESH_INTERVAL),
            state_tx,
        }
    }

    /// Wire up newsdata.io and the sentiment service from configuration
    pub fn from_config(config: &MonitorConfig) -> Result<Self> {
        config.validate()?;
        let fetcher = NewsFetcher::from_config(config)?;
        let analyzer = SentimentAnalyzer::from_config(config)?;
        Ok(Self::new(fetcher, analyzer, config))
    }

    /// Restrict the articles analyzed each cycle
    pub fn with_category(mut self, category: NewsCategory) -> Self {
        self.category = category;
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.state_tx.subscribe()
    }

    pub fn state(&self) -> DashboardState {
        self.state_tx.borrow().clone()
    }

    pub fn history(&self) -> &SentimentHistory {
        &self.history
    }

    /// Run one full cycle and publish the outcome
    ///
    /// On failure the previous snapshot and metrics stay published and the
    /// state moves to [`CycleState::Failed`].
    pub async fn run_cycle(&mut self) -> Result<MarketMetrics> {
        match self.execute().await {
            Ok((snapshot, metrics, articles)) => {
                info!(
                    overall = snapshot.overall_sentiment,
                    label = %snapshot.label(),
                    history = self.history.len(),
                    "Refresh cycle complete"
                );
                let history: Vec<HistoryPoint> = self.history.points().copied().collect();
                let published = metrics.clone();
                self.state_tx.send_modify(|state| {
                    state.state = CycleState::Idle;
                    state.last_updated = Some(snapshot.observed_at);
                    state.snapshot = Some(snapshot);
                    state.metrics = Some(published);
                    state.articles = articles;
                    state.history = history;
                    state.last_error = None;
                    state.cycles_completed += 1;
                });
                Ok(metrics)
            }
            Err(err) => {
                error!("Refresh cycle failed: {}", err);
                let message = err.to_string();
                self.state_tx.send_modify(|state| {
                    state.state = CycleState::Failed {
                        message: message.clone(),
                    };
                    state.last_error = Some(message);
                });
                Err(err)
            }
        }
    }

    async fn execute(&mut self) -> Result<(SentimentSnapshot, MarketMetrics, Vec<Article>)> {
        self.set_stage(CycleState::Fetching);
        let batch = self.fetcher.refresh(&self.category).await?;
        if batch.is_empty() {
            return Err(SentimentError::NoArticles);
        }

        self.set_stage(CycleState::Analyzing);
        let snapshot = self.analyzer.analyze(&batch.articles).await?;

        self.set_stage(CycleState::Updating);
        self.history.append(&snapshot);
        let metrics = metrics::compute(&snapshot, &self.history, &batch.articles);

        Ok((snapshot, metrics, batch.articles))
    }

    fn set_stage(&self, stage: CycleState) {
        debug!("Cycle stage: {}", stage);
        self.state_tx.send_modify(|state| state.state = stage);
    }

    /// Move the loop onto a background task
    ///
    /// The first cycle starts immediately, then every refresh interval.
    pub fn spawn(mut self) -> OrchestratorHandle {
        let (trigger_tx, mut trigger_rx) = mpsc::channel::<()>(1);
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let state_rx = self.subscribe();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.refresh_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    _ = &mut shutdown_rx => {
                        info!("Refresh loop shutting down");
                        break;
                    }
                    trigger = trigger_rx.recv() => {
                        if trigger.is_none() {
                            debug!("All handles dropped, stopping refresh loop");
                            break;
                        }
                        debug!("Manual refresh triggered");
                    }
                    _ = ticker.tick() => {
                        debug!("Scheduled refresh");
                    }
                }

                // Errors are already published to subscribers
                let _ = self.run_cycle().await;
            }
        });

        OrchestratorHandle {
            trigger_tx,
            state_rx,
            shutdown_tx: Some(shutdown_tx),
            task,
        }
    }
}

/// Control surface for a spawned [`Orchestrator`]
pub struct OrchestratorHandle {
    trigger_tx: mpsc::Sender<()>,
    state_rx: watch::Receiver<DashboardState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl OrchestratorHandle {
    /// Request a refresh outside the regular schedule
    pub fn trigger(&self) -> TriggerOutcome {
        match self.trigger_tx.try_send(()) {
            Ok(()) => TriggerOutcome::Queued,
            Err(mpsc::error::TrySendError::Full(())) => {
                debug!("Refresh already queued, dropping trigger");
                TriggerOutcome::AlreadyQueued
            }
            Err(mpsc::error::TrySendError::Closed(())) => TriggerOutcome::Stopped,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.state_rx.clone()
    }

    pub fn state(&self) -> DashboardState {
        self.state_rx.borrow().clone()
    }

    /// Stop the timer and wait for the loop to exit
    ///
    /// A cycle already in flight is allowed to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Err(err) = (&mut self.task).await {
            warn!("Refresh loop ended abnormally: {}", err);
        }
    }
}
