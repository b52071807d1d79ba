use serde::{Deserialize, Serialize};
use std::fmt;

/// Human-facing risk tier derived from a (decision, confidence) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    HighRisk,
    Suspicious,
    PotentialFraud,
    AppearsSafe,
    LowRisk,
    Normal,
}

impl RiskTier {
    /// Map a decision and fraud-class confidence to a tier.
    ///
    /// Fraud bands: `> 0.9`, `(0.7, 0.9]`, `<= 0.7`.
    /// Safe bands: `< 0.1`, `[0.1, 0.3)`, `>= 0.3`.
    pub fn derive(is_fraud: bool, confidence: f64) -> Self {
        if is_fraud {
            if confidence > 0.9 {
                RiskTier::HighRisk
            } else if confidence > 0.7 {
                RiskTier::Suspicious
            } else {
                RiskTier::PotentialFraud
            }
        } else if confidence < 0.1 {
            RiskTier::AppearsSafe
        } else if confidence < 0.3 {
            RiskTier::LowRisk
        } else {
            RiskTier::Normal
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            RiskTier::HighRisk => "High risk transaction detected! Immediate attention required.",
            RiskTier::Suspicious => "Suspicious transaction detected. Review recommended.",
            RiskTier::PotentialFraud => "Potential fraud detected. Please verify.",
            RiskTier::AppearsSafe => "Transaction appears safe.",
            RiskTier::LowRisk => "Low risk transaction.",
            RiskTier::Normal => "Transaction within normal parameters.",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
