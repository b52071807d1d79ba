// Scaler + classifier pipeline
pub mod engine;

// ONNX Runtime session over a scikit-learn export
pub mod onnx_classifier;

// Classifier interface
pub mod predictor;

// Time/amount scaling
pub mod scaler;

pub use engine::{EngineState, ScoringEngine};
pub use onnx_classifier::OnnxClassifier;
pub use predictor::Classifier;
pub use scaler::ScalingArtifact;
