//! Prometheus metric registry
//!
//! Owns a [`PrometheusRecorder`] and the metric handles registered against it.
//! The registry is created once at startup and shared by the poll loop and
//! the metrics server; no global recorder is installed.

use metrics::{
    counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Counter,
    Gauge, Histogram, Unit,
};
use metrics_exporter_prometheus::{
    BuildError, Matcher, PrometheusBuilder, PrometheusHandle, PrometheusRecorder,
};
use std::time::Duration;

use crate::api::Credits;
use crate::error::FetchError;

pub const TOTAL_CREDITS: &str = "openrouter_total_credits";
pub const TOTAL_USAGE: &str = "openrouter_total_usage";
pub const REQUEST_DURATION: &str = "openrouter_api_request_duration";
pub const SUCCESSFUL_REQUESTS: &str = "openrouter_api_successful_requests";
pub const FAILED_REQUESTS: &str = "openrouter_api_failed_requests";
pub const ERROR_CODE_LABEL: &str = "error_code";

/// Request duration buckets in seconds
pub const DURATION_BUCKETS: [f64; 11] = [
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Exporter metrics backed by a dedicated Prometheus recorder
pub struct ExporterMetrics {
    recorder: PrometheusRecorder,
    handle: PrometheusHandle,
    total_credits: Gauge,
    total_usage: Gauge,
    request_duration: Histogram,
    successful_requests: Counter,
}

impl ExporterMetrics {
    /// Build the recorder and register every series.
    pub fn new() -> Result<Self, BuildError> {
        let recorder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Full(REQUEST_DURATION.to_string()),
                &DURATION_BUCKETS,
            )?
            .build_recorder();
        let handle = recorder.handle();

        let (total_credits, total_usage, request_duration, successful_requests) =
            metrics::with_local_recorder(&recorder, || {
                describe_gauge!(TOTAL_CREDITS, "Total credits granted to the account");
                describe_gauge!(TOTAL_USAGE, "Total credits consumed by the account");
                describe_histogram!(
                    REQUEST_DURATION,
                    Unit::Seconds,
                    "Duration of credits API requests"
                );
                describe_counter!(SUCCESSFUL_REQUESTS, "Successful credits API requests");
                describe_counter!(FAILED_REQUESTS, "Failed credits API requests");

                (
                    gauge!(TOTAL_CREDITS),
                    gauge!(TOTAL_USAGE),
                    histogram!(REQUEST_DURATION),
                    counter!(SUCCESSFUL_REQUESTS),
                )
            });

        Ok(Self {
            recorder,
            handle,
            total_credits,
            total_usage,
            request_duration,
            successful_requests,
        })
    }

    /// Overwrite both gauges with the latest totals
    pub fn set_credits(&self, credits: &Credits) {
        self.total_credits.set(credits.total);
        self.total_usage.set(credits.usage);
    }

    /// Record the outcome of one fetch attempt.
    ///
    /// Every attempt is observed by the duration histogram and counted
    /// exactly once, as a success or under its error code.
    pub fn record_attempt<T>(&self, elapsed: Duration, result: &Result<T, FetchError>) {
        self.request_duration.record(elapsed.as_secs_f64());
        match result {
            Ok(_) => self.successful_requests.increment(1),
            Err(e) => self.failed_requests(e.error_code()).increment(1),
        }
    }

    fn failed_requests(&self, code: i64) -> Counter {
        metrics::with_local_recorder(&self.recorder, || {
            counter!(FAILED_REQUESTS, ERROR_CODE_LABEL => code.to_string())
        })
    }

    /// Render all series in the text exposition format
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

impl std::fmt::Debug for ExporterMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExporterMetrics").finish_non_exhaustive()
    }
}
