// Canonical feature schema and vector builder
pub mod feature_registry;

// Decision/confidence to message tiers
pub mod risk_tier;

pub use feature_registry::{FeatureInput, FeatureVector, RawFeature};
pub use risk_tier::RiskTier;
