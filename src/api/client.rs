//! Credits endpoint client

use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::types::{ApiResponse, Credits};
use crate::config::ApiConfig;
use crate::error::{ConfigError, FetchError};

/// Client for the OpenRouter credits endpoint.
///
/// No request timeout is configured; a stalled request only ends when the
/// transport gives up or the cancellation token fires.
#[derive(Clone)]
pub struct CreditsClient {
    client: Client,
    endpoint: String,
    token: String,
}

impl CreditsClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .user_agent(concat!("openrouter-exporter/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            token: config.token.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Perform one GET against the endpoint and decode the envelope.
    ///
    /// The HTTP status is not checked: the API returns its error envelope with
    /// 4xx statuses, so the envelope code decides the outcome.
    pub async fn fetch_credits(&self, cancel: &CancellationToken) -> Result<Credits, FetchError> {
        tokio::select! {
            result = self.request() => result,
            _ = cancel.cancelled() => Err(FetchError::Cancelled),
        }
    }

    async fn request(&self) -> Result<Credits, FetchError> {
        let response = self
            .client
            .get(&self.endpoint)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .send()
            .await?;

        let status = response.status();
        // Consumes the response, releasing the connection on every path.
        let body = response.bytes().await?;
        debug!(%status, bytes = body.len(), "Received credits response");

        let envelope = ApiResponse::<Credits>::from_slice(&body)?;
        if envelope.error.is_error() {
            return Err(FetchError::Api {
                code: envelope.error.code,
                message: envelope.error.message,
            });
        }

        Ok(envelope.data)
    }
}

impl std::fmt::Debug for CreditsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreditsClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}
