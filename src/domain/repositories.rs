//! Repository abstraction for prediction persistence.
//!
//! `PredictionRepository` is the storage boundary behind the prediction
//! ledger. Implementations must make each insert atomic and answer
//! `stats()` from a single snapshot, so a concurrent insert is either fully
//! counted or not counted at all.
//!
//! # Implementations
//!
//! - `SqlitePredictionRepository`: durable store backed by sqlx/SQLite
//! - `InMemoryPredictionRepository`: `RwLock`-guarded store for tests and
//!   single-instance deployments without a database

use crate::domain::errors::StorageError;
use crate::domain::prediction::{AggregateStats, PredictionRecord};
use async_trait::async_trait;

/// Repository for persisting and querying scoring events
#[async_trait]
pub trait PredictionRepository: Send + Sync {
    /// Insert a record; fails with `DuplicateIdentifier` if the id exists
    async fn insert(&self, record: &PredictionRecord) -> Result<(), StorageError>;

    /// Most recent records, newest first
    async fn find_recent(&self, limit: usize) -> Result<Vec<PredictionRecord>, StorageError>;

    /// Aggregate statistics over all records
    async fn stats(&self) -> Result<AggregateStats, StorageError>;

    /// Backend name for logs
    fn name(&self) -> &str;
}
