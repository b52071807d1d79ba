//! Fraud detection service: runs the scoring pipeline and forwards each
//! result to the prediction ledger.
//!
//! ```text
//! FeatureInput -> FeatureVector -> scaler -> classifier -> RiskTier
//!                                                   |
//!                                                   v
//!                                          PredictionLedger (best effort)
//! ```

use crate::application::ledger::PredictionLedger;
use crate::application::ml::ScoringEngine;
use crate::domain::errors::ScoringError;
use crate::domain::ml::{FeatureInput, FeatureVector, RiskTier};
use crate::domain::prediction::{PredictionRecord, Score, new_transaction_id};
use crate::infrastructure::observability::Metrics;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use rayon::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Maximum number of transactions accepted in one batch.
pub const MAX_BATCH_SIZE: usize = 100;

/// Result of scoring one transaction
#[derive(Debug, Clone, Serialize)]
pub struct PredictionOutcome {
    pub fraud: bool,
    pub confidence: f64,
    pub message: &'static str,
    pub transaction_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip)]
    pub tier: RiskTier,
    #[serde(skip)]
    pub persisted: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    pub predictions: Vec<PredictionOutcome>,
    pub total_processed: usize,
    pub fraud_count: usize,
    pub safe_count: usize,
}

pub struct FraudDetectionService {
    engine: Arc<ScoringEngine>,
    ledger: Arc<PredictionLedger>,
    metrics: Option<Metrics>,
}

impl FraudDetectionService {
    pub fn new(engine: Arc<ScoringEngine>, ledger: Arc<PredictionLedger>) -> Self {
        Self {
            engine,
            ledger,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    pub fn ledger(&self) -> &PredictionLedger {
        &self.ledger
    }

    /// Build, scale and score one input without touching the ledger.
    pub fn score_input(&self, input: &FeatureInput) -> Result<(FeatureVector, Score), ScoringError> {
        score_one(&self.engine, self.metrics.as_ref(), input)
    }

    /// Score a batch in parallel, preserving input order.
    ///
    /// Readiness is checked first, then the `MAX_BATCH_SIZE` bound, both before
    /// any item is scored. Any invalid item fails the whole batch.
    pub fn score_batch(
        &self,
        inputs: &[FeatureInput],
    ) -> Result<Vec<(FeatureVector, Score)>, ScoringError> {
        score_all(&self.engine, self.metrics.as_ref(), inputs)
    }

    /// Score one transaction and record it.
    pub async fn predict(
        &self,
        input: &FeatureInput,
        client_ip: Option<String>,
    ) -> Result<PredictionOutcome, ScoringError> {
        let (vector, score) = self.score_input(input)?;
        let outcome = self.record(vector, score, client_ip).await;

        info!(
            transaction_id = %outcome.transaction_id,
            fraud = outcome.fraud,
            confidence = outcome.confidence,
            "Prediction"
        );
        Ok(outcome)
    }

    /// Score and record a batch of transactions.
    pub async fn predict_batch(
        &self,
        inputs: &[FeatureInput],
        client_ip: Option<String>,
    ) -> Result<BatchOutcome, ScoringError> {
        check_batch(&self.engine, self.metrics.as_ref(), inputs.len())?;

        // rayon fan-out stays off the async workers
        let engine = self.engine.clone();
        let metrics = self.metrics.clone();
        let inputs = inputs.to_vec();
        let scored = tokio::task::spawn_blocking(move || {
            score_all(&engine, metrics.as_ref(), &inputs)
        })
        .await
        .map_err(|e| ScoringError::InferenceFailed {
            reason: format!("batch scoring task failed: {}", e),
        })??;

        let predictions = join_all(
            scored
                .into_iter()
                .map(|(vector, score)| self.record(vector, score, client_ip.clone())),
        )
        .await;

        let fraud_count = predictions.iter().filter(|p| p.fraud).count();
        info!(
            total = predictions.len(),
            fraud_count, "Batch prediction"
        );

        Ok(BatchOutcome {
            total_processed: predictions.len(),
            safe_count: predictions.len() - fraud_count,
            fraud_count,
            predictions,
        })
    }

    async fn record(
        &self,
        vector: FeatureVector,
        score: Score,
        client_ip: Option<String>,
    ) -> PredictionOutcome {
        let transaction_id = new_transaction_id();
        let timestamp = Utc::now();
        let record = PredictionRecord::new(
            transaction_id.clone(),
            &vector,
            score,
            timestamp,
            client_ip,
        );
        let persisted = self.ledger.record(record).await.is_some();
        if !persisted {
            debug!(transaction_id = %transaction_id, "Prediction not persisted");
        }

        let tier = score.tier();
        PredictionOutcome {
            fraud: score.is_fraud,
            confidence: score.confidence,
            message: tier.message(),
            transaction_id,
            timestamp,
            tier,
            persisted,
        }
    }
}

fn check_batch(
    engine: &ScoringEngine,
    metrics: Option<&Metrics>,
    size: usize,
) -> Result<(), ScoringError> {
    if !engine.is_ready() {
        return Err(ScoringError::ModelNotReady);
    }
    if size > MAX_BATCH_SIZE {
        if let Some(metrics) = metrics {
            metrics.batch_rejections_total.inc();
        }
        return Err(ScoringError::BatchTooLarge {
            size,
            max: MAX_BATCH_SIZE,
        });
    }
    Ok(())
}

fn score_one(
    engine: &ScoringEngine,
    metrics: Option<&Metrics>,
    input: &FeatureInput,
) -> Result<(FeatureVector, Score), ScoringError> {
    if !engine.is_ready() {
        return Err(ScoringError::ModelNotReady);
    }

    let started = Instant::now();
    let result = FeatureVector::from_input(input)
        .and_then(|vector| engine.score(&vector).map(|score| (vector, score)));

    if let Some(metrics) = metrics {
        match &result {
            Ok((_, score)) => {
                metrics.record_prediction(score.is_fraud, started.elapsed().as_secs_f64())
            }
            Err(_) => metrics.record_rejection(),
        }
    }
    result
}

fn score_all(
    engine: &ScoringEngine,
    metrics: Option<&Metrics>,
    inputs: &[FeatureInput],
) -> Result<Vec<(FeatureVector, Score)>, ScoringError> {
    check_batch(engine, metrics, inputs.len())?;

    inputs
        .par_iter()
        .map(|input| score_one(engine, metrics, input))
        .collect()
}
