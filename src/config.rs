//! Configuration management
//!
//! Options come from command line flags or their environment variables and are
//! resolved into a validated [`Config`] at startup.

use clap::Parser;
use std::time::Duration;

use crate::error::ConfigError;
use crate::VERSION;

pub const DEFAULT_API_ENDPOINT: &str = "https://openrouter.ai/api/v1/credits";
pub const DEFAULT_WATCH_INTERVAL: &str = "15s";
pub const DEFAULT_EXPORTER_ADDRESS: &str = ":9080";
pub const DEFAULT_EXPORTER_ENDPOINT: &str = "/metrics";

/// Export OpenRouter credit balance and usage as Prometheus metrics
#[derive(Debug, Clone, Parser)]
#[command(name = "openrouter-exporter")]
#[command(version = VERSION)]
pub struct Args {
    /// Billing info URL to poll
    #[arg(long, env = "OPENROUTER_API_ENDPOINT", default_value = DEFAULT_API_ENDPOINT)]
    pub api_endpoint: String,

    /// Bearer token sent with every request
    #[arg(long, env = "OPENROUTER_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Poll interval (e.g. "15s", "1m30s")
    #[arg(long, env = "WATCH_INTERVAL", default_value = DEFAULT_WATCH_INTERVAL)]
    pub watch_interval: String,

    /// Metrics server bind address
    #[arg(long, env = "EXPORTER_ADDRESS", default_value = DEFAULT_EXPORTER_ADDRESS)]
    pub exporter_address: String,

    /// Metrics server path
    #[arg(long, env = "EXPORTER_ENDPOINT", default_value = DEFAULT_EXPORTER_ENDPOINT)]
    pub exporter_endpoint: String,

    /// Log level filter, overridden by RUST_LOG
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format: "json" or "pretty"
    #[arg(long, env = "LOG_FORMAT", default_value = "json")]
    pub log_format: String,
}

/// Root configuration structure
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub interval: Duration,
    pub exporter: ExporterConfig,
}

/// Remote billing API
#[derive(Clone)]
pub struct ApiConfig {
    pub endpoint: String,
    pub token: String,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("endpoint", &self.endpoint)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Metrics server configuration
#[derive(Debug, Clone)]
pub struct ExporterConfig {
    /// Address to bind, in `host:port` form
    pub bind_addr: String,
    /// Path serving the exposition
    pub path: String,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Output format: "json" or "pretty"
    pub format: String,
}

impl Args {
    pub fn logging(&self) -> LoggingConfig {
        LoggingConfig {
            level: self.log_level.clone(),
            format: self.log_format.clone(),
        }
    }
}

impl Config {
    /// Validate parsed arguments
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let token = match args.api_token.as_deref() {
            Some(token) if !token.is_empty() => token.to_string(),
            _ => return Err(ConfigError::MissingToken),
        };

        let interval = parse_duration(&args.watch_interval).ok_or_else(|| {
            ConfigError::InvalidInterval {
                value: args.watch_interval.clone(),
            }
        })?;
        if interval.is_zero() {
            return Err(ConfigError::NonPositiveInterval {
                value: args.watch_interval.clone(),
            });
        }

        Ok(Config {
            api: ApiConfig {
                endpoint: args.api_endpoint.clone(),
                token,
            },
            interval,
            exporter: ExporterConfig {
                bind_addr: normalize_bind_addr(&args.exporter_address),
                path: normalize_path(&args.exporter_endpoint),
            },
        })
    }
}

/// Expand a bare `:port` listen address to the IPv6 wildcard, which also
/// accepts IPv4 on dual-stack hosts.
fn normalize_bind_addr(addr: &str) -> String {
    if addr.starts_with(':') {
        format!("[::]{addr}")
    } else {
        addr.to_string()
    }
}

fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

/// Parse a duration such as `15s`, `1m30s`, `1.5h` or `250ms`.
///
/// Returns `None` on malformed input. Negative durations parse but clamp to
/// zero, so callers reject them together with zero.
pub fn parse_duration(input: &str) -> Option<Duration> {
    let (negative, mut rest) = match input.as_bytes().first() {
        Some(b'-') => (true, &input[1..]),
        Some(b'+') => (false, &input[1..]),
        _ => (false, input),
    };

    if rest == "0" {
        return Some(Duration::ZERO);
    }
    if rest.is_empty() {
        return None;
    }

    let mut total_nanos: f64 = 0.0;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let number = &rest[..number_len];
        if number.is_empty() || number == "." || number.matches('.').count() > 1 {
            return None;
        }
        let value: f64 = number.parse().ok()?;
        rest = &rest[number_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let scale = match &rest[..unit_len] {
            "ns" => 1.0,
            "us" | "µs" | "μs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            _ => return None,
        };
        rest = &rest[unit_len..];

        total_nanos += value * scale;
    }

    if !total_nanos.is_finite() || total_nanos > u64::MAX as f64 {
        return None;
    }
    if negative {
        return Some(Duration::ZERO);
    }
    Some(Duration::from_nanos(total_nanos as u64))
}
