//! Model artifact configuration parsing from environment variables.

use std::env;
use std::path::PathBuf;

pub const DEFAULT_MODEL_PATH: &str = "model/fraud_model.onnx";
pub const DEFAULT_SCALER_PATH: &str = "model/scaler.json";

/// Locations of the classifier and scaler artifacts
#[derive(Debug, Clone)]
pub struct ModelEnvConfig {
    pub model_path: PathBuf,
    pub scaler_path: PathBuf,
}

impl Default for ModelEnvConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            scaler_path: PathBuf::from(DEFAULT_SCALER_PATH),
        }
    }
}

impl ModelEnvConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let path = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(default))
        };

        Self {
            model_path: path("MODEL_PATH", DEFAULT_MODEL_PATH),
            scaler_path: path("SCALER_PATH", DEFAULT_SCALER_PATH),
        }
    }
}
