//! Observability configuration parsing from environment variables.
//!
//! This module handles loading metrics and log format configuration.

use std::str::FromStr;

/// Output format of the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => anyhow::bail!("Invalid LOG_FORMAT: {}. Must be 'pretty' or 'json'", s),
        }
    }
}

/// Observability environment configuration
#[derive(Debug, Clone)]
pub struct ObservabilityEnvConfig {
    pub enabled: bool,
    pub log_format: LogFormat,
}

impl Default for ObservabilityEnvConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_format: LogFormat::Pretty,
        }
    }
}

impl ObservabilityEnvConfig {
    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            enabled: lookup("OBSERVABILITY_ENABLED")
                .and_then(|v| v.parse::<bool>().ok())
                .unwrap_or(true),
            log_format: lookup("LOG_FORMAT")
                .and_then(|v| v.parse::<LogFormat>().ok())
                .unwrap_or_default(),
        }
    }
}
