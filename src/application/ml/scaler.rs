use crate::domain::errors::ScoringError;
use crate::domain::ml::FeatureVector;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Scaler file format understood by this engine version.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalerKind {
    /// `(x - mean) / scale`
    Standard,
}

/// Fitted affine transform over the (time, amount) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingArtifact {
    pub format_version: u32,
    pub kind: ScalerKind,
    pub mean: [f64; 2],
    pub scale: [f64; 2],
}

impl ScalingArtifact {
    pub fn standard(mean: [f64; 2], scale: [f64; 2]) -> Self {
        Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            kind: ScalerKind::Standard,
            mean,
            scale,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, ScoringError> {
        if !path.exists() {
            return Err(ScoringError::model_load(path.display(), "file not found"));
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ScoringError::model_load(path.display(), e))?;
        let artifact: ScalingArtifact = serde_json::from_str(&content).map_err(|e| {
            ScoringError::model_load(path.display(), format!("invalid scaler: {}", e))
        })?;
        artifact
            .validate()
            .map_err(|reason| ScoringError::model_load(path.display(), reason))?;
        Ok(artifact)
    }

    fn validate(&self) -> Result<(), String> {
        if self.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(format!(
                "unsupported format_version {} (expected {})",
                self.format_version, ARTIFACT_FORMAT_VERSION
            ));
        }
        if self.mean.iter().chain(self.scale.iter()).any(|v| !v.is_finite()) {
            return Err("non-finite scaler parameter".to_string());
        }
        Ok(())
    }

    /// Transform a (time, amount) pair.
    pub fn transform(&self, pair: [f64; 2]) -> [f64; 2] {
        match self.kind {
            ScalerKind::Standard => {
                let mut out = [0.0; 2];
                for i in 0..2 {
                    // Constant columns are fitted with a zero scale; leave them unscaled
                    let scale = if self.scale[i] == 0.0 { 1.0 } else { self.scale[i] };
                    out[i] = (pair[i] - self.mean[i]) / scale;
                }
                out
            }
        }
    }
}

/// Apply the scaler to time and amount, returning a new vector.
///
/// Without a scaler this is the identity. The input vector is never modified
/// and the other 28 positions are copied bit for bit.
pub fn apply(vector: &FeatureVector, scaler: Option<&ScalingArtifact>) -> FeatureVector {
    match scaler {
        Some(scaler) => {
            let [time, amount] = scaler.transform([vector.time(), vector.amount()]);
            vector.with_time_amount(time, amount)
        }
        None => *vector,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ml::feature_registry::{AMOUNT_INDEX, FEATURE_COUNT, TIME_INDEX};

    fn sample_vector() -> FeatureVector {
        let mut values = [0.0; FEATURE_COUNT];
        for (i, v) in values.iter_mut().enumerate() {
            *v = (i as f64) * 0.37 - 3.1;
        }
        values[TIME_INDEX] = 94_813.86;
        values[AMOUNT_INDEX] = 88.35;
        FeatureVector::from_values(values).unwrap()
    }

    #[test]
    fn test_standard_transform() {
        let scaler = ScalingArtifact::standard([94_813.86, 88.35], [47_488.15, 250.12]);
        let [t, a] = scaler.transform([94_813.86 + 47_488.15, 88.35 - 250.12]);
        assert!((t - 1.0).abs() < 1e-9);
        assert!((a + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_only_time_and_amount_change() {
        let scaler = ScalingArtifact::standard([1000.0, 50.0], [10.0, 5.0]);
        let original = sample_vector();
        let scaled = apply(&original, Some(&scaler));

        for i in 1..AMOUNT_INDEX {
            assert_eq!(
                scaled.get(i).unwrap().to_bits(),
                original.get(i).unwrap().to_bits()
            );
        }
        assert_ne!(scaled.time(), original.time());
        assert_ne!(scaled.amount(), original.amount());
    }

    #[test]
    fn test_input_vector_is_untouched() {
        let scaler = ScalingArtifact::standard([1000.0, 50.0], [10.0, 5.0]);
        let original = sample_vector();
        let snapshot = original;
        let _ = apply(&original, Some(&scaler));
        assert_eq!(original, snapshot);
    }

    #[test]
    fn test_no_scaler_is_identity() {
        let original = sample_vector();
        assert_eq!(apply(&original, None), original);
    }

    #[test]
    fn test_zero_scale_is_treated_as_one() {
        let scaler = ScalingArtifact::standard([10.0, 0.0], [0.0, 2.0]);
        assert_eq!(scaler.transform([12.0, 4.0]), [2.0, 2.0]);
    }

    #[test]
    fn test_scaler_file_round_trip_and_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scaler.json");

        let scaler = ScalingArtifact::standard([1.0, 2.0], [3.0, 4.0]);
        std::fs::write(&path, serde_json::to_string(&scaler).unwrap()).unwrap();
        assert_eq!(ScalingArtifact::from_path(&path).unwrap(), scaler);

        std::fs::write(&path, r#"{"format_version": 1, "kind": "standard", "mean": [1.0]}"#).unwrap();
        assert!(ScalingArtifact::from_path(&path).is_err());

        assert!(ScalingArtifact::from_path(&dir.path().join("missing.json")).is_err());
    }
}
