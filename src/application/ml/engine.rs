use super::onnx_classifier::OnnxClassifier;
use super::predictor::Classifier;
use super::scaler::{self, ScalingArtifact};
use crate::domain::errors::ScoringError;
use crate::domain::ml::FeatureVector;
use crate::domain::prediction::Score;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Unloaded,
    Ready,
}

struct LoadedModel {
    classifier: Box<dyn Classifier>,
    kind: &'static str,
}

/// Scaler + classifier pipeline.
///
/// Loading takes `&mut self` and happens during startup; once the engine is
/// wrapped in an `Arc` it is read-only and `score` needs no locking.
pub struct ScoringEngine {
    model: Option<LoadedModel>,
    scaler: Option<ScalingArtifact>,
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoringEngine {
    pub fn new() -> Self {
        Self {
            model: None,
            scaler: None,
        }
    }

    /// Build a ready engine around an in-memory classifier.
    pub fn from_parts(classifier: Box<dyn Classifier>, scaler: Option<ScalingArtifact>) -> Self {
        Self {
            model: Some(LoadedModel {
                classifier,
                kind: "custom",
            }),
            scaler,
        }
    }

    /// Load the ONNX model. On failure the previous model (if any) is kept.
    pub fn load(&mut self, path: &Path) -> Result<EngineState, ScoringError> {
        info!("Loading scoring model from {:?}", path);
        let classifier = OnnxClassifier::from_path(path)?;

        info!(
            model = classifier.name(),
            features = classifier.n_features(),
            "Scoring model loaded"
        );
        self.model = Some(LoadedModel {
            classifier: Box::new(classifier),
            kind: "onnx",
        });
        Ok(self.state())
    }

    /// Load the scaling artifact. On failure the previous scaler (if any) is kept.
    pub fn load_scaler(&mut self, path: &Path) -> Result<(), ScoringError> {
        info!("Loading scaler from {:?}", path);
        let scaler = ScalingArtifact::from_path(path)?;
        self.scaler = Some(scaler);
        info!("Scaler loaded");
        Ok(())
    }

    pub fn state(&self) -> EngineState {
        if self.model.is_some() {
            EngineState::Ready
        } else {
            EngineState::Unloaded
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state() == EngineState::Ready
    }

    pub fn scaler_loaded(&self) -> bool {
        self.scaler.is_some()
    }

    pub fn model_kind(&self) -> Option<&'static str> {
        self.model.as_ref().map(|m| m.kind)
    }

    pub fn model_name(&self) -> Option<&str> {
        self.model.as_ref().map(|m| m.classifier.name())
    }

    /// Score a vector: scale, then run the classifier.
    ///
    /// Pure function of (artifacts, vector); no caching.
    pub fn score(&self, vector: &FeatureVector) -> Result<Score, ScoringError> {
        let model = self.model.as_ref().ok_or(ScoringError::ModelNotReady)?;

        let scaled = scaler::apply(vector, self.scaler.as_ref());
        let (class, [safe_probability, fraud_probability]) = model
            .classifier
            .classify(scaled.as_slice())
            .map_err(|reason| ScoringError::InferenceFailed { reason })?;

        let total = safe_probability + fraud_probability;
        if !safe_probability.is_finite() || !fraud_probability.is_finite() || !total.is_finite() {
            return Err(ScoringError::InferenceFailed {
                reason: format!(
                    "model returned non-finite probabilities [{}, {}]",
                    safe_probability, fraud_probability
                ),
            });
        }
        if total <= 0.0 {
            return Err(ScoringError::InferenceFailed {
                reason: "model returned an empty probability distribution".to_string(),
            });
        }

        let score = Score {
            is_fraud: class == 1,
            confidence: fraud_probability.clamp(0.0, 1.0),
        };
        debug!(
            is_fraud = score.is_fraud,
            confidence = score.confidence,
            "Vector scored"
        );
        Ok(score)
    }
}
