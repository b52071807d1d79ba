#![allow(dead_code)]

pub mod onnx;

use fraud_scorer::application::ml::ScoringEngine;
use fraud_scorer::domain::ml::{FeatureInput, RawFeature};
use serde_json::json;
use std::path::{Path, PathBuf};

/// Scaler fitted on amounts with mean 100 and scale 50 (time left as-is).
pub const AMOUNT_MEAN: f64 = 100.0;
pub const AMOUNT_SCALE: f64 = 50.0;

pub fn scaler_artifact() -> serde_json::Value {
    json!({
        "format_version": 1,
        "kind": "standard",
        "mean": [0.0, AMOUNT_MEAN],
        "scale": [1.0, AMOUNT_SCALE]
    })
}

pub fn write_json(dir: &Path, name: &str, value: &serde_json::Value) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, value.to_string()).unwrap();
    path
}

/// Classifier splitting on the scaled amount at 0.0 (the scaler mean):
/// `p_fraud = sigmoid(2 * scaled_amount)`.
pub fn write_scaled_model(dir: &Path) -> PathBuf {
    onnx::write_amount_classifier(dir, "fraud_model.onnx", 0.0, 2.0)
}

/// Engine loaded from the ONNX model and scaler fixtures written under `dir`.
pub fn scaled_engine(dir: &Path) -> ScoringEngine {
    let model = write_scaled_model(dir);
    let scaler = write_json(dir, "scaler.json", &scaler_artifact());

    let mut engine = ScoringEngine::new();
    engine.load(&model).unwrap();
    engine.load_scaler(&scaler).unwrap();
    engine
}

pub fn input(pairs: &[(&str, f64)]) -> FeatureInput {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), RawFeature::Number(*v)))
        .collect()
}
