//! Metrics and observability
//!
//! Prometheus registry for the exporter's series and the scrape endpoint.

mod exporter;
mod server;

pub use exporter::*;
pub use server::MetricsServer;
