use thiserror::Error;

/// Errors raised by the scoring pipeline (feature building, artifact loading, inference)
#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("Invalid value for feature '{key}': {reason}")]
    InvalidFeatureValue { key: String, reason: String },

    #[error("Model not loaded: scoring requires a loaded artifact")]
    ModelNotReady,

    #[error("Failed to load artifact from {path}: {reason}")]
    ModelLoad { path: String, reason: String },

    #[error("Inference failed: {reason}")]
    InferenceFailed { reason: String },

    #[error("Batch size {size} exceeds maximum of {max} transactions")]
    BatchTooLarge { size: usize, max: usize },
}

impl ScoringError {
    pub fn invalid_feature(key: &str, reason: impl Into<String>) -> Self {
        ScoringError::InvalidFeatureValue {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub fn model_load(path: impl std::fmt::Display, reason: impl std::fmt::Display) -> Self {
        ScoringError::ModelLoad {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Errors raised at the prediction store boundary.
///
/// These never cross the ledger: the ledger logs them and degrades.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Storage operation timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    #[error("Duplicate transaction identifier: {identifier}")]
    DuplicateIdentifier { identifier: String },

    #[error("Corrupt stored record {identifier}: {reason}")]
    CorruptRecord { identifier: String, reason: String },
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        StorageError::Unavailable {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_feature_formatting() {
        let err = ScoringError::invalid_feature("v14", "not a number: \"abc\"");

        let msg = err.to_string();
        assert!(msg.contains("v14"));
        assert!(msg.contains("abc"));
    }

    #[test]
    fn test_batch_too_large_formatting() {
        let err = ScoringError::BatchTooLarge { size: 101, max: 100 };

        let msg = err.to_string();
        assert!(msg.contains("101"));
        assert!(msg.contains("100"));
    }

    #[test]
    fn test_storage_timeout_formatting() {
        let err = StorageError::Timeout { duration_ms: 5000 };
        assert!(err.to_string().contains("5000ms"));
    }
}
