//! Background feature poller.
//!
//! # Responsibilities
//! - Periodically fetch the feature snapshot from the upstream provider
//! - Build a candidate table under the capacity invariant
//! - Publish snapshot and table atomically on a clean cycle
//! - Apply the configured overflow policy
//!
//! # Design Decisions
//! - The sleep is additive after each cycle, not a fixed-rate schedule; a
//!   slow cycle delays the next one by its own duration plus the interval
//! - Transport, status and parse failures are always non-fatal: log, keep
//!   the stale state, retry next interval
//! - Under the `crash` policy an overflow signals the fatal shutdown flag
//!   and the main loop brings the process down; nothing new is published

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use axum::body::Body;
use axum::http::{Request, StatusCode, Uri};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::time;

use crate::config::{FeaturePollConfig, OverflowPolicy};
use crate::features::cache::{FeatureCache, FeatureSnapshot, FeatureState};
use crate::features::table::{FeatureTable, FeatureTableOverflow};
use crate::lifecycle::Shutdown;

/// Wire format of the provider response:
/// `{"data": [[name, type], ...], "refreshed_at": epoch_seconds}`.
#[derive(Debug, Deserialize)]
struct FeatureFeed {
    data: Vec<(String, String)>,
    refreshed_at: u64,
}

/// One poll cycle's failure modes.
#[derive(Debug, Error)]
pub enum PollError {
    #[error("feature fetch timed out")]
    Timeout,
    #[error("failed to build feature request: {0}")]
    Request(#[from] axum::http::Error),
    #[error("transport error reaching feature provider: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),
    #[error("failed to read feature payload: {0}")]
    Body(#[from] axum::Error),
    #[error("feature provider returned HTTP {0}")]
    Status(StatusCode),
    #[error("malformed feature payload: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Overflow(#[from] FeatureTableOverflow),
}

/// Long-lived background task fetching the feature snapshot.
pub struct FeaturePoller {
    client: Client<HttpConnector, Body>,
    url: Uri,
    interval: Duration,
    fetch_timeout: Duration,
    capacity: usize,
    on_overflow: OverflowPolicy,
    cache: Arc<FeatureCache>,
    shutdown: Arc<Shutdown>,
}

impl FeaturePoller {
    pub fn new(
        config: &FeaturePollConfig,
        cache: Arc<FeatureCache>,
        shutdown: Arc<Shutdown>,
    ) -> Result<Self, axum::http::Error> {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        let url = config.url.parse::<Uri>()?;

        Ok(Self {
            client,
            url,
            interval: Duration::from_secs(config.poll_interval_secs),
            fetch_timeout: Duration::from_secs(config.fetch_timeout_secs),
            capacity: config.table_capacity,
            on_overflow: config.on_overflow,
            cache,
            shutdown,
        })
    }

    /// Run until shutdown. Each iteration: one cycle, then sleep the interval.
    pub async fn run(self, mut shutdown_rx: broadcast::Receiver<()>) {
        tracing::info!(
            url = %self.url,
            interval_secs = self.interval.as_secs(),
            capacity = self.capacity,
            policy = ?self.on_overflow,
            "feature poller starting"
        );

        loop {
            match self.poll_once().await {
                Ok(_) => {}
                Err(PollError::Overflow(overflow)) => match self.on_overflow {
                    OverflowPolicy::Crash => {
                        tracing::error!(
                            error = %overflow,
                            "feature table overflow under crash policy, requesting process shutdown"
                        );
                        self.shutdown.trigger_fatal();
                        return;
                    }
                    OverflowPolicy::Retry => {
                        tracing::warn!(
                            error = %overflow,
                            "feature table overflow, dropping this cycle's update"
                        );
                    }
                },
                Err(e) => {
                    tracing::warn!(error = %e, "feature poll failed, keeping stale snapshot");
                }
            }

            tokio::select! {
                _ = time::sleep(self.interval) => {}
                _ = shutdown_rx.recv() => {
                    tracing::info!("feature poller received shutdown signal, exiting loop");
                    return;
                }
            }
        }
    }

    /// Run a single cycle: fetch, parse, build the candidate, publish.
    ///
    /// Nothing is published unless the whole cycle succeeds. Returns the
    /// published row count.
    pub async fn poll_once(&self) -> Result<usize, PollError> {
        let feed = self.fetch().await?;

        let names: Vec<&String> = feed.data.iter().map(|(name, _)| name).collect();
        let table = FeatureTable::from_names(self.capacity, &names)?;

        let row_count = feed.data.len();
        self.cache.publish(FeatureState {
            snapshot: FeatureSnapshot {
                row_count,
                refreshed_at: SystemTime::now(),
            },
            table,
        });

        tracing::info!(
            rows = row_count,
            refreshed_at = feed.refreshed_at,
            "feature snapshot updated"
        );
        Ok(row_count)
    }

    async fn fetch(&self) -> Result<FeatureFeed, PollError> {
        let request = Request::builder()
            .method("GET")
            .uri(self.url.clone())
            .header("user-agent", "botgate-feature-poller")
            .body(Body::empty())?;

        let response = time::timeout(self.fetch_timeout, self.client.request(request))
            .await
            .map_err(|_| PollError::Timeout)??;

        if response.status() != StatusCode::OK {
            return Err(PollError::Status(response.status()));
        }

        let body = axum::body::to_bytes(Body::new(response.into_body()), usize::MAX).await?;
        let feed: FeatureFeed = serde_json::from_slice(&body)?;
        Ok(feed)
    }
}
