//! Configuration module for the fraud scoring service.
//!
//! This module provides structured configuration loading from environment variables,
//! organized by concern: Model, Storage, Server, and Observability.

mod model_config;
mod observability_config;
mod server_config;
mod storage_config;

pub use model_config::ModelEnvConfig;
pub use observability_config::{LogFormat, ObservabilityEnvConfig};
pub use server_config::ServerEnvConfig;
pub use storage_config::StorageEnvConfig;

use anyhow::{Context, Result};
use std::env;

/// Main application configuration.
///
/// Aggregates every sub-config; each one reads its own variables.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub model: ModelEnvConfig,
    pub storage: StorageEnvConfig,
    pub server: ServerEnvConfig,
    pub observability: ObservabilityEnvConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is loaded first when present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            model: ModelEnvConfig::from_lookup(&lookup),
            storage: StorageEnvConfig::from_lookup(&lookup),
            server: ServerEnvConfig::from_lookup(&lookup).context("Failed to load server config")?,
            observability: ObservabilityEnvConfig::from_lookup(&lookup),
        })
    }
}
