use crate::domain::errors::ScoringError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Number of features the classifier consumes.
pub const FEATURE_COUNT: usize = 30;

/// Position of the elapsed-time feature.
pub const TIME_INDEX: usize = 0;

/// Position of the transaction amount feature.
pub const AMOUNT_INDEX: usize = 29;

/// Ordered list of feature names.
/// This order MUST match exactly with the column order used at training time.
/// Any change here is a breaking change for model and scaler artifacts.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "time", "v1", "v2", "v3", "v4", "v5", "v6", "v7", "v8", "v9", "v10", "v11", "v12", "v13",
    "v14", "v15", "v16", "v17", "v18", "v19", "v20", "v21", "v22", "v23", "v24", "v25", "v26",
    "v27", "v28", "amount",
];

/// A raw feature value as it arrives on the wire.
///
/// Numbers and numeric strings are accepted; `null` counts as absent.
/// Anything else is kept so the builder can reject it with the offending key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawFeature {
    Null,
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl From<f64> for RawFeature {
    fn from(value: f64) -> Self {
        RawFeature::Number(value)
    }
}

impl From<&str> for RawFeature {
    fn from(value: &str) -> Self {
        RawFeature::Text(value.to_string())
    }
}

/// Input mapping keyed by lowercase feature name.
pub type FeatureInput = HashMap<String, RawFeature>;

/// Fixed-order vector of the 30 model features. All values are finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    /// Build a vector from an input mapping.
    ///
    /// Missing (or null) keys default to `0.0`. A present value that does not
    /// parse to a finite number fails with `InvalidFeatureValue`; it is never
    /// silently zeroed. Keys outside `FEATURE_NAMES` are ignored.
    pub fn from_input(input: &FeatureInput) -> Result<Self, ScoringError> {
        let mut values = [0.0; FEATURE_COUNT];
        for (slot, name) in values.iter_mut().zip(FEATURE_NAMES.iter()) {
            if let Some(raw) = input.get(*name) {
                *slot = parse_raw(name, raw)?;
            }
        }
        Ok(Self(values))
    }

    /// Build a vector from already-ordered values, rejecting non-finite entries.
    pub fn from_values(values: [f64; FEATURE_COUNT]) -> Result<Self, ScoringError> {
        for (value, name) in values.iter().zip(FEATURE_NAMES.iter()) {
            ensure_finite(name, *value)?;
        }
        Ok(Self(values))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }

    pub fn time(&self) -> f64 {
        self.0[TIME_INDEX]
    }

    pub fn amount(&self) -> f64 {
        self.0[AMOUNT_INDEX]
    }

    /// Copy of this vector with time and amount replaced.
    pub fn with_time_amount(&self, time: f64, amount: f64) -> Self {
        let mut values = self.0;
        values[TIME_INDEX] = time;
        values[AMOUNT_INDEX] = amount;
        Self(values)
    }

    /// Feature values keyed by canonical name (persisted alongside predictions).
    pub fn to_named_map(&self) -> BTreeMap<String, f64> {
        FEATURE_NAMES
            .iter()
            .zip(self.0.iter())
            .map(|(name, value)| (name.to_string(), *value))
            .collect()
    }
}

fn parse_raw(key: &str, raw: &RawFeature) -> Result<f64, ScoringError> {
    match raw {
        RawFeature::Null => Ok(0.0),
        RawFeature::Number(value) => ensure_finite(key, *value),
        RawFeature::Text(text) => {
            let value = text
                .trim()
                .parse::<f64>()
                .map_err(|_| ScoringError::invalid_feature(key, format!("not a number: {:?}", text)))?;
            ensure_finite(key, value)
        }
        RawFeature::Other(value) => Err(ScoringError::invalid_feature(
            key,
            format!("unsupported value type: {}", value),
        )),
    }
}

fn ensure_finite(key: &str, value: f64) -> Result<f64, ScoringError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ScoringError::invalid_feature(
            key,
            format!("non-finite value: {}", value),
        ))
    }
}
