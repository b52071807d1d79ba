use crate::domain::ml::{FeatureVector, RiskTier};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Output of a single pass through the scoring pipeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    pub is_fraud: bool,
    /// Probability of the fraud class, in `[0, 1]`
    pub confidence: f64,
}

impl Score {
    pub fn tier(&self) -> RiskTier {
        RiskTier::derive(self.is_fraud, self.confidence)
    }
}

/// Generate a transaction identifier: `txn_` followed by 16 lowercase hex digits.
pub fn new_transaction_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("txn_{}", &hex[..16])
}

/// A persisted scoring event. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub transaction_id: String,
    pub input_features: BTreeMap<String, f64>,
    pub prediction: bool,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
    pub client_ip: Option<String>,
}

impl PredictionRecord {
    pub fn new(
        transaction_id: String,
        features: &FeatureVector,
        score: Score,
        timestamp: DateTime<Utc>,
        client_ip: Option<String>,
    ) -> Self {
        Self {
            transaction_id,
            input_features: features.to_named_map(),
            prediction: score.is_fraud,
            confidence: score.confidence,
            timestamp,
            client_ip,
        }
    }
}

/// Aggregate statistics over every recorded prediction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct AggregateStats {
    #[serde(rename = "total_predictions")]
    pub total: u64,
    pub fraud_count: u64,
    pub safe_count: u64,
    pub fraud_percentage: f64,
    pub avg_confidence: f64,
}

impl AggregateStats {
    /// Derive stats from raw aggregates taken from one snapshot.
    ///
    /// `fraud_count` is clamped to `total` so the safe count never underflows.
    pub fn from_aggregates(total: u64, fraud_count: u64, confidence_sum: f64) -> Self {
        if total == 0 {
            return Self::default();
        }

        let fraud_count = fraud_count.min(total);
        Self {
            total,
            fraud_count,
            safe_count: total - fraud_count,
            fraud_percentage: fraud_count as f64 / total as f64 * 100.0,
            avg_confidence: confidence_sum / total as f64,
        }
    }

    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a PredictionRecord>) -> Self {
        let (total, fraud, sum) = records.into_iter().fold((0u64, 0u64, 0.0), |acc, r| {
            (acc.0 + 1, acc.1 + u64::from(r.prediction), acc.2 + r.confidence)
        });
        Self::from_aggregates(total, fraud, sum)
    }
}
