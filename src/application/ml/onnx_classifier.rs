//! ONNX Runtime classifier for scikit-learn exports.
//!
//! Expects the graph layout `skl2onnx` produces for a binary classifier
//! converted with `options={'zipmap': False}`: one float input of shape
//! `[N, 30]`, an int64 `label` output and a float `probabilities` output of
//! shape `[N, 2]` ordered `[safe, fraud]`.

use super::predictor::Classifier;
use crate::domain::errors::ScoringError;
use crate::domain::ml::feature_registry::FEATURE_COUNT;
use anyhow::Context;
use ort::session::Session;
use ort::value::Tensor;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

const LABEL_OUTPUT: &str = "label";
const PROBABILITY_OUTPUT: &str = "prob";

pub struct OnnxClassifier {
    // `Session::run` needs exclusive access
    session: Mutex<Session>,
    input_name: String,
    label_output: String,
    probability_output: String,
    name: String,
}

impl OnnxClassifier {
    /// Open an exported model.
    ///
    /// The session must expose a label and a probability output and must
    /// score an all-zero vector successfully, otherwise nothing is returned.
    pub fn from_path(path: &Path) -> Result<Self, ScoringError> {
        if !path.exists() {
            return Err(ScoringError::model_load(path.display(), "file not found"));
        }

        let session = open_session(path)
            .map_err(|e| ScoringError::model_load(path.display(), format!("{:#}", e)))?;
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("onnx")
            .to_string();
        let classifier = Self::from_session(session, name)
            .map_err(|reason| ScoringError::model_load(path.display(), reason))?;

        classifier
            .classify(&[0.0; FEATURE_COUNT])
            .map_err(|reason| {
                ScoringError::model_load(path.display(), format!("test inference failed: {}", reason))
            })?;

        info!(
            model = %classifier.name,
            input = %classifier.input_name,
            label = %classifier.label_output,
            probabilities = %classifier.probability_output,
            "ONNX session ready"
        );
        Ok(classifier)
    }

    fn from_session(session: Session, name: String) -> Result<Self, String> {
        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .ok_or("model declares no inputs")?;
        let label_output = find_output(&session, LABEL_OUTPUT)?;
        let probability_output = find_output(&session, PROBABILITY_OUTPUT)?;

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            label_output,
            probability_output,
            name,
        })
    }

    /// One session run: predicted label and normalized `[safe, fraud]`.
    fn infer(&self, features: &[f64]) -> Result<(i64, [f64; 2]), String> {
        if features.len() != FEATURE_COUNT {
            return Err(format!(
                "expected {} features, got {}",
                FEATURE_COUNT,
                features.len()
            ));
        }

        // skl2onnx declares a float32 input
        let data: Vec<f32> = features.iter().map(|&v| v as f32).collect();
        let input = Tensor::from_array((vec![1_i64, FEATURE_COUNT as i64], data))
            .map_err(|e| format!("Input tensor creation failed: {}", e))?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| format!("Mutex lock failed: {}", e))?;
        let outputs = session
            .run(ort::inputs![&self.input_name => input])
            .map_err(|e| e.to_string())?;

        let label_value = outputs
            .get(self.label_output.as_str())
            .ok_or_else(|| format!("missing '{}' output", self.label_output))?;
        let (_, labels) = label_value
            .try_extract_tensor::<i64>()
            .map_err(|e| e.to_string())?;
        let label = *labels.first().ok_or("empty label output")?;

        let probability_value = outputs
            .get(self.probability_output.as_str())
            .ok_or_else(|| format!("missing '{}' output", self.probability_output))?;
        let (_, probabilities) = probability_value
            .try_extract_tensor::<f32>()
            .map_err(|e| e.to_string())?;
        let probabilities = normalize_probabilities(probabilities)?;

        debug!(label, p_fraud = probabilities[1], "ONNX inference");
        Ok((label, probabilities))
    }
}

impl Classifier for OnnxClassifier {
    fn predict(&self, features: &[f64]) -> Result<u8, String> {
        self.classify(features).map(|(class, _)| class)
    }

    fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2], String> {
        self.infer(features).map(|(_, probabilities)| probabilities)
    }

    fn classify(&self, features: &[f64]) -> Result<(u8, [f64; 2]), String> {
        let (label, probabilities) = self.infer(features)?;
        match label {
            0 | 1 => Ok((label as u8, probabilities)),
            other => Err(format!("unexpected class label {}", other)),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn n_features(&self) -> usize {
        FEATURE_COUNT
    }
}

fn open_session(path: &Path) -> anyhow::Result<Session> {
    let session = Session::builder()?
        .with_intra_threads(1)?
        .commit_from_file(path)
        .with_context(|| format!("Failed to load model from {:?}", path))?;
    Ok(session)
}

/// Exact output name first, then the first output containing `pattern`.
fn find_output(session: &Session, pattern: &str) -> Result<String, String> {
    session
        .outputs
        .iter()
        .find(|output| output.name == pattern)
        .or_else(|| {
            session
                .outputs
                .iter()
                .find(|output| output.name.contains(pattern))
        })
        .map(|output| output.name.clone())
        .ok_or_else(|| format!("model has no '{}' output", pattern))
}

/// Two class probabilities rescaled to sum to 1.
///
/// Negative or non-finite entries, and pairs whose sum is zero or overflows,
/// are rejected.
pub(crate) fn normalize_probabilities(raw: &[f32]) -> Result<[f64; 2], String> {
    let (safe, fraud) = match raw {
        [safe, fraud] => (f64::from(*safe), f64::from(*fraud)),
        _ => {
            return Err(format!(
                "expected 2 class probabilities, got {}",
                raw.len()
            ));
        }
    };

    let total = safe + fraud;
    let valid = safe.is_finite() && fraud.is_finite() && safe >= 0.0 && fraud >= 0.0;
    if !valid || !total.is_finite() || total <= 0.0 {
        return Err(format!("invalid class probabilities [{}, {}]", safe, fraud));
    }
    Ok([safe / total, fraud / total])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probabilities_are_normalized_to_one() {
        for raw in [[0.25_f32, 0.75], [0.3, 0.6999999], [2.0, 6.0], [0.0, 1.0]] {
            let [safe, fraud] = normalize_probabilities(&raw).unwrap();
            assert!((safe + fraud - 1.0).abs() < 1e-12, "{:?}", raw);
        }
        let [safe, fraud] = normalize_probabilities(&[2.0, 6.0]).unwrap();
        assert_eq!(safe, 0.25);
        assert_eq!(fraud, 0.75);
    }

    #[test]
    fn test_degenerate_probabilities_are_rejected() {
        assert!(normalize_probabilities(&[0.0, 0.0]).is_err());
        assert!(normalize_probabilities(&[f32::MAX, f32::INFINITY]).is_err());
        assert!(normalize_probabilities(&[f32::NAN, 0.5]).is_err());
        assert!(normalize_probabilities(&[-0.2, 1.2]).is_err());
        assert!(normalize_probabilities(&[0.1, 0.2, 0.7]).is_err());
        assert!(normalize_probabilities(&[]).is_err());
    }

    #[test]
    fn test_missing_model_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fraud_model.onnx");
        let err = OnnxClassifier::from_path(&path).err().unwrap();
        assert!(matches!(err, ScoringError::ModelLoad { .. }));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_non_onnx_bytes_fail_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fraud_model.onnx");
        std::fs::write(&path, b"{\"format_version\": 1}").unwrap();

        let err = OnnxClassifier::from_path(&path).err().unwrap();
        assert!(matches!(err, ScoringError::ModelLoad { ref path, .. } if path.ends_with("fraud_model.onnx")));
    }
}
