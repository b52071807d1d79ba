//! Prediction ledger: best-effort persistence and aggregate queries.
//!
//! Every store call is bounded by a timeout. When the store is missing,
//! unreachable, slow, or rejects a write, the ledger logs a warning, bumps
//! `fraud_scorer_ledger_failures_total` and returns its degraded result:
//! `None` from `record`, an empty list from `recent`, zeroed stats from
//! `stats`. Storage errors never reach the scoring caller.

use crate::domain::errors::StorageError;
use crate::domain::prediction::{AggregateStats, PredictionRecord};
use crate::domain::repositories::PredictionRepository;
use crate::infrastructure::observability::Metrics;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_STORAGE_TIMEOUT: Duration = Duration::from_secs(5);

pub struct PredictionLedger {
    store: Option<Arc<dyn PredictionRepository>>,
    timeout: Duration,
    metrics: Option<Metrics>,
}

impl PredictionLedger {
    pub fn new(store: Arc<dyn PredictionRepository>, timeout: Duration) -> Self {
        Self {
            store: Some(store),
            timeout,
            metrics: None,
        }
    }

    /// Ledger without a backing store; every operation degrades.
    pub fn detached() -> Self {
        Self {
            store: None,
            timeout: DEFAULT_STORAGE_TIMEOUT,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn is_connected(&self) -> bool {
        self.store.is_some()
    }

    pub fn backend(&self) -> &str {
        self.store.as_ref().map(|s| s.name()).unwrap_or("none")
    }

    /// Persist a record. Returns the identifier on success, `None` otherwise.
    pub async fn record(&self, record: PredictionRecord) -> Option<String> {
        let identifier = record.transaction_id.clone();
        let result = self
            .run("record", |store| async move { store.insert(&record).await })
            .await;

        match result {
            Ok(()) => {
                debug!(transaction_id = %identifier, "Prediction logged");
                Some(identifier)
            }
            Err(e) => {
                self.degrade("record", &e);
                None
            }
        }
    }

    /// Most recent records, newest first, at most `limit`.
    pub async fn recent(&self, limit: usize) -> Vec<PredictionRecord> {
        if limit == 0 {
            return Vec::new();
        }
        match self
            .run("recent", |store| async move { store.find_recent(limit).await })
            .await
        {
            Ok(records) => records,
            Err(e) => {
                self.degrade("recent", &e);
                Vec::new()
            }
        }
    }

    pub async fn stats(&self) -> AggregateStats {
        match self
            .run("stats", |store| async move { store.stats().await })
            .await
        {
            Ok(stats) => stats,
            Err(e) => {
                self.degrade("stats", &e);
                AggregateStats::default()
            }
        }
    }

    async fn run<T, F, Fut>(&self, operation: &'static str, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(Arc<dyn PredictionRepository>) -> Fut,
        Fut: Future<Output = Result<T, StorageError>>,
    {
        let store = self.store.clone().ok_or_else(|| StorageError::Unavailable {
            reason: format!("no store configured for {}", operation),
        })?;

        match tokio::time::timeout(self.timeout, f(store)).await {
            Ok(result) => result,
            Err(_) => Err(StorageError::Timeout {
                duration_ms: self.timeout.as_millis() as u64,
            }),
        }
    }

    fn degrade(&self, operation: &str, error: &StorageError) {
        if self.store.is_some() {
            warn!(operation, error = %error, "Ledger operation failed, continuing without storage");
        } else {
            debug!(operation, "Ledger detached, skipping");
        }
        if let Some(metrics) = &self.metrics {
            metrics.record_ledger_failure(operation);
        }
    }
}
