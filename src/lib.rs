//! OpenRouter Exporter - credit balance metrics for Prometheus
//!
//! Polls the OpenRouter credits endpoint on a fixed interval and republishes
//! the account totals, request latency and request outcomes as metrics.

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod util;
pub mod watcher;

pub use config::Config;
pub use watcher::Watcher;

/// Exporter version for display
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
