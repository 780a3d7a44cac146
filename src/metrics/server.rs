//! HTTP endpoint for Prometheus scraping
//!
//! Serves the registry's exposition at a single configurable path.

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, warn};

use super::exporter::ExporterMetrics;
use crate::config::ExporterConfig;
use crate::error::ListenError;

const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Bound metrics server, ready to serve
pub struct MetricsServer {
    listener: TcpListener,
    router: Router,
}

impl MetricsServer {
    /// Bind the listener.
    ///
    /// Binding happens separately from serving so that a port conflict is
    /// reported before the poll loop starts.
    pub async fn bind(
        config: &ExporterConfig,
        metrics: Arc<ExporterMetrics>,
    ) -> Result<Self, ListenError> {
        let listener = match TcpListener::bind(&config.bind_addr).await {
            Ok(listener) => listener,
            Err(e) => match ipv4_fallback(&config.bind_addr, &e) {
                Some(fallback) => {
                    warn!(error = %e, address = %fallback, "IPv6 unavailable, binding IPv4 only");
                    TcpListener::bind(&fallback)
                        .await
                        .map_err(|source| ListenError {
                            addr: fallback,
                            source,
                        })?
                }
                None => {
                    return Err(ListenError {
                        addr: config.bind_addr.clone(),
                        source: e,
                    })
                }
            },
        };

        let router = Router::new()
            .route(&config.path, get(render_metrics))
            .with_state(metrics);

        Ok(Self { listener, router })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve scrapes until the process exits
    pub async fn serve(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router).await
    }
}

/// IPv4 wildcard to retry with when the IPv6 wildcard cannot be bound on a
/// host without IPv6. Conflicts and permission errors are never retried.
fn ipv4_fallback(addr: &str, err: &std::io::Error) -> Option<String> {
    use std::io::ErrorKind;

    if matches!(err.kind(), ErrorKind::AddrInUse | ErrorKind::PermissionDenied) {
        return None;
    }
    addr.strip_prefix("[::]:").map(|port| format!("0.0.0.0:{port}"))
}

async fn render_metrics(State(metrics): State<Arc<ExporterMetrics>>) -> impl IntoResponse {
    debug!("Serving metrics scrape");
    ([(header::CONTENT_TYPE, CONTENT_TYPE)], metrics.render())
}
