//! Prediction ledger storage configuration parsing from environment variables.

use std::time::Duration;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/predictions.db";

/// Storage environment configuration
#[derive(Debug, Clone)]
pub struct StorageEnvConfig {
    /// When false the service runs with a detached ledger
    pub enabled: bool,
    pub database_url: String,
    pub timeout_ms: u64,
    pub max_connections: u32,
}

impl Default for StorageEnvConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            timeout_ms: 5000,
            max_connections: 5,
        }
    }
}

impl StorageEnvConfig {
    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            enabled: lookup("STORAGE_ENABLED")
                .and_then(|v| v.parse::<bool>().ok())
                .unwrap_or(defaults.enabled),
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            timeout_ms: lookup("STORAGE_TIMEOUT_MS")
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|ms| *ms > 0)
                .unwrap_or(defaults.timeout_ms),
            max_connections: lookup("STORAGE_MAX_CONNECTIONS")
                .and_then(|v| v.parse::<u32>().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_connections),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
