//! Poll loop integration tests

mod common;

use std::sync::Arc;
use std::time::Duration;

use openrouter_exporter::api::CreditsClient;
use openrouter_exporter::config::ApiConfig;
use openrouter_exporter::metrics::{ExporterMetrics, TOTAL_CREDITS};
use openrouter_exporter::Watcher;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::sample_value;

fn watcher_for(server: &MockServer, interval: Duration) -> (Watcher, Arc<ExporterMetrics>) {
    let metrics = Arc::new(ExporterMetrics::new().unwrap());
    let client = CreditsClient::new(&ApiConfig {
        endpoint: server.uri(),
        token: "sk-or-test".to_string(),
    })
    .unwrap();
    (Watcher::new(client, metrics.clone(), interval), metrics)
}

async fn credits_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {"total_credits": 50.0, "total_usage": 12.0},
            "error": {"code": 0}
        })))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_first_poll_is_immediate() {
    let server = credits_server().await;
    let (watcher, metrics) = watcher_for(&server, Duration::from_secs(3600));
    let cancel = CancellationToken::new();

    let run = tokio::spawn({
        let cancel = cancel.clone();
        async move { watcher.run(cancel).await }
    });

    let mut polled = false;
    for _ in 0..100 {
        if sample_value(&metrics.render(), TOTAL_CREDITS) == Some(50.0) {
            polled = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(polled, "first poll should not wait a full interval");

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(5), run)
        .await
        .expect("watcher should stop after cancellation")
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].headers["authorization"].to_str().unwrap(),
        "Bearer sk-or-test"
    );
}

#[tokio::test]
async fn test_polls_every_interval() {
    let server = credits_server().await;
    let (watcher, metrics) = watcher_for(&server, Duration::from_millis(50));
    let cancel = CancellationToken::new();

    let run = tokio::spawn({
        let cancel = cancel.clone();
        async move { watcher.run(cancel).await }
    });

    tokio::time::sleep(Duration::from_millis(400)).await;
    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(5), run)
        .await
        .expect("watcher should stop after cancellation")
        .unwrap();

    let polls = server.received_requests().await.unwrap().len();
    assert!(polls >= 3, "expected several polls, got {polls}");

    // A poll in flight at cancellation is counted as a failure.
    let successes = sample_value(&metrics.render(), "openrouter_api_successful_requests")
        .unwrap_or_default();
    assert!(successes >= (polls - 1) as f64, "{successes} of {polls} polls succeeded");
}

#[tokio::test]
async fn test_cancelled_before_start() {
    let server = credits_server().await;
    let (watcher, _metrics) = watcher_for(&server, Duration::from_secs(1));
    let cancel = CancellationToken::new();
    cancel.cancel();

    tokio::time::timeout(Duration::from_secs(5), watcher.run(cancel))
        .await
        .expect("watcher should return immediately");
}
