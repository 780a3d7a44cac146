//! OpenRouter billing API
//!
//! Wire types and the HTTP client for the credits endpoint.

mod client;
mod types;

pub use client::CreditsClient;
pub use types::{ApiError, ApiResponse, Credits};
