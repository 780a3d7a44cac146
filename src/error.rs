//! Error types
//!
//! Startup errors are fatal; fetch errors are absorbed by the poll loop.

use thiserror::Error;

/// Invalid or missing startup configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("OPENROUTER_API_TOKEN is not set")]
    MissingToken,

    #[error("WATCH_INTERVAL is not a valid duration: {value:?}")]
    InvalidInterval { value: String },

    #[error("WATCH_INTERVAL must be positive, got {value:?}")]
    NonPositiveInterval { value: String },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// A single failed credits fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, DNS, TLS or body read failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The request was abandoned because shutdown was requested.
    #[error("request cancelled")]
    Cancelled,

    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("API error (code {code}): {message}")]
    Api { code: i64, message: String },
}

impl FetchError {
    /// Value for the `error_code` label of the failed-requests counter.
    ///
    /// Only API-reported errors carry a code; everything else maps to `0`.
    pub fn error_code(&self) -> i64 {
        match self {
            FetchError::Api { code, .. } => *code,
            FetchError::Transport(_) | FetchError::Cancelled | FetchError::Decode(_) => 0,
        }
    }
}

/// The metrics listener could not be bound.
#[derive(Debug, Error)]
#[error("failed to bind metrics server on {addr}: {source}")]
pub struct ListenError {
    pub addr: String,
    #[source]
    pub source: std::io::Error,
}
