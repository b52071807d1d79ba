/// Interface for trained binary classifiers.
///
/// Implementations are shared read-only across concurrent scoring calls.
pub trait Classifier: Send + Sync {
    /// Predicted class: `0` (safe) or `1` (fraud)
    fn predict(&self, features: &[f64]) -> Result<u8, String>;

    /// Class membership probabilities `[p_safe, p_fraud]`
    fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2], String>;

    /// Class and probabilities together. Override when one inference yields both.
    fn classify(&self, features: &[f64]) -> Result<(u8, [f64; 2]), String> {
        Ok((self.predict(features)?, self.predict_proba(features)?))
    }

    /// Get model name/type
    fn name(&self) -> &str;

    /// Number of input features the model was trained on
    fn n_features(&self) -> usize;
}
