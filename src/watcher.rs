//! Credits poll loop
//!
//! Fetches the account's credits on a fixed interval and republishes them
//! through the metric registry.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::api::{Credits, CreditsClient};
use crate::error::FetchError;
use crate::metrics::ExporterMetrics;

/// Periodic fetch-and-publish driver
#[derive(Debug)]
pub struct Watcher {
    client: CreditsClient,
    metrics: Arc<ExporterMetrics>,
    interval: Duration,
}

impl Watcher {
    pub fn new(client: CreditsClient, metrics: Arc<ExporterMetrics>, interval: Duration) -> Self {
        Self {
            client,
            metrics,
            interval,
        }
    }

    /// Poll until `cancel` fires.
    ///
    /// The first poll runs immediately. Ticks missed while a fetch is in
    /// flight are skipped, so fetches never overlap.
    pub async fn run(&self, cancel: CancellationToken) {
        info!(
            api_endpoint = %self.client.endpoint(),
            interval = ?self.interval,
            "Starting credits watcher"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let result = self.fetch(&cancel).await;
                    self.publish(&result);
                }
            }
        }

        info!("Credits watcher stopped");
    }

    /// Run one cycle: fetch, then update the gauges on success.
    ///
    /// On failure the gauges keep their previous values.
    pub async fn poll_once(&self, cancel: &CancellationToken) -> Result<Credits, FetchError> {
        let result = self.fetch(cancel).await;
        self.publish(&result);
        result
    }

    fn publish(&self, result: &Result<Credits, FetchError>) {
        match result {
            Ok(credits) => {
                self.metrics.set_credits(credits);
                info!(
                    total_credits = credits.total,
                    total_usage = credits.usage,
                    "Credits info"
                );
            }
            Err(e) => {
                error!(error = %e, error_code = e.error_code(), "Failed to get credits info");
            }
        }
    }

    /// Perform one request and record its duration and outcome.
    pub async fn fetch(&self, cancel: &CancellationToken) -> Result<Credits, FetchError> {
        let started = Instant::now();
        let result = self.client.fetch_credits(cancel).await;
        self.metrics.record_attempt(started.elapsed(), &result);
        result
    }
}
