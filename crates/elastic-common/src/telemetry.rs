//! Tracing initialization
//!
//! Structured logging through `tracing-subscriber`, filtered by `RUST_LOG`
//! and rendered either as JSON (in-cluster) or human-readable text.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::Error;

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info,elastic=debug,kube=info,tower=warn,hyper=warn";

/// Output format for log lines
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line
    #[default]
    Json,
    /// Human-readable text
    Text,
}

impl std::str::FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" | "pretty" => Ok(Self::Text),
            other => Err(Error::validation(format!("unknown log format '{other}'"))),
        }
    }
}

/// Configuration for tracing initialization
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name recorded on startup (e.g., "elastic-operator")
    pub service_name: String,
    /// Log line format
    pub format: LogFormat,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "elastic-operator".to_string(),
            format: LogFormat::default(),
        }
    }
}

/// Install the global tracing subscriber.
///
/// Fails if a subscriber was already installed for this process.
pub fn init_tracing(config: &TelemetryConfig) -> Result<(), Error> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = match config.format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init(),
    };
    result.map_err(|e| Error::internal_with_context("telemetry", e.to_string()))?;

    tracing::debug!(service = %config.service_name, "tracing initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_format_parses_case_insensitively() {
        assert_eq!("JSON".parse::<LogFormat>().ok(), Some(LogFormat::Json));
        assert_eq!("text".parse::<LogFormat>().ok(), Some(LogFormat::Text));
        assert_eq!("pretty".parse::<LogFormat>().ok(), Some(LogFormat::Text));
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        let err = "xml".parse::<LogFormat>().unwrap_err();
        assert!(err.to_string().contains("xml"));
    }

    #[test]
    fn default_config_logs_json() {
        let config = TelemetryConfig::default();
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.service_name, "elastic-operator");
    }
}
