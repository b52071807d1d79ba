//! In-Memory Repository Implementation
//!
//! Thread-safe, in-memory implementation of `PredictionRepository`.
//!
//! # Features
//!
//! - **Atomic inserts**: the uniqueness check and the append happen under one
//!   write lock, so `stats()` never sees half a record
//! - **Testing**: Ideal for unit tests and development
//!
//! # Limitations
//!
//! - Data is lost on application restart
//! - Limited by available RAM

use crate::domain::errors::StorageError;
use crate::domain::prediction::{AggregateStats, PredictionRecord};
use crate::domain::repositories::PredictionRepository;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Ledger {
    records: Vec<PredictionRecord>,
    identifiers: HashSet<String>,
}

/// In-memory implementation of PredictionRepository
#[derive(Clone, Default)]
pub struct InMemoryPredictionRepository {
    inner: Arc<RwLock<Ledger>>,
}

impl InMemoryPredictionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl PredictionRepository for InMemoryPredictionRepository {
    async fn insert(&self, record: &PredictionRecord) -> Result<(), StorageError> {
        let mut ledger = self.inner.write().await;
        if !ledger.identifiers.insert(record.transaction_id.clone()) {
            return Err(StorageError::DuplicateIdentifier {
                identifier: record.transaction_id.clone(),
            });
        }
        ledger.records.push(record.clone());
        Ok(())
    }

    async fn find_recent(&self, limit: usize) -> Result<Vec<PredictionRecord>, StorageError> {
        let ledger = self.inner.read().await;
        // Newest insert first, then a stable sort keeps that order for equal timestamps
        let mut records: Vec<&PredictionRecord> = ledger.records.iter().rev().collect();
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(records.into_iter().take(limit).cloned().collect())
    }

    async fn stats(&self) -> Result<AggregateStats, StorageError> {
        let ledger = self.inner.read().await;
        Ok(AggregateStats::from_records(&ledger.records))
    }

    fn name(&self) -> &str {
        "memory"
    }
}
