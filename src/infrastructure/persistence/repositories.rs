use crate::domain::errors::StorageError;
use crate::domain::prediction::{AggregateStats, PredictionRecord};
use crate::domain::repositories::PredictionRepository;
use async_trait::async_trait;
use chrono::DateTime;
use sqlx::{Row, SqlitePool};
use tracing::debug;

pub struct SqlitePredictionRepository {
    pool: SqlitePool,
}

impl SqlitePredictionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PredictionRepository for SqlitePredictionRepository {
    async fn insert(&self, record: &PredictionRecord) -> Result<(), StorageError> {
        let features = serde_json::to_string(&record.input_features).map_err(|e| {
            StorageError::CorruptRecord {
                identifier: record.transaction_id.clone(),
                reason: e.to_string(),
            }
        })?;

        // Single statement: the row is either fully visible or absent
        let result = sqlx::query(
            r#"
            INSERT INTO predictions
            (transaction_id, input_features, prediction, confidence, timestamp, client_ip)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.transaction_id)
        .bind(features)
        .bind(record.prediction)
        .bind(record.confidence)
        .bind(record.timestamp.timestamp_micros())
        .bind(&record.client_ip)
        .execute(&self.pool)
        .await;

        if let Err(e) = result {
            let duplicate = matches!(&e, sqlx::Error::Database(db) if db.is_unique_violation());
            return Err(if duplicate {
                StorageError::DuplicateIdentifier {
                    identifier: record.transaction_id.clone(),
                }
            } else {
                e.into()
            });
        }

        debug!("Persisted prediction {}", record.transaction_id);
        Ok(())
    }

    async fn find_recent(&self, limit: usize) -> Result<Vec<PredictionRecord>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT transaction_id, input_features, prediction, confidence, timestamp, client_ip
            FROM predictions
            ORDER BY timestamp DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        self.map_rows_to_records(rows)
    }

    async fn stats(&self) -> Result<AggregateStats, StorageError> {
        // One aggregate statement reads a single snapshot
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS total,
                   COALESCE(SUM(CASE WHEN prediction THEN 1 ELSE 0 END), 0) AS fraud_count,
                   COALESCE(SUM(confidence), 0.0) AS confidence_sum
            FROM predictions
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let total: i64 = row.try_get("total")?;
        let fraud_count: i64 = row.try_get("fraud_count")?;
        let confidence_sum: f64 = row.try_get("confidence_sum")?;

        Ok(AggregateStats::from_aggregates(
            total.max(0) as u64,
            fraud_count.max(0) as u64,
            confidence_sum,
        ))
    }

    fn name(&self) -> &str {
        "sqlite"
    }
}

impl SqlitePredictionRepository {
    fn map_rows_to_records(
        &self,
        rows: Vec<sqlx::sqlite::SqliteRow>,
    ) -> Result<Vec<PredictionRecord>, StorageError> {
        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let transaction_id: String = row.try_get("transaction_id")?;
            let corrupt = |reason: String| StorageError::CorruptRecord {
                identifier: transaction_id.clone(),
                reason,
            };

            let features_json: String = row.try_get("input_features")?;
            let input_features =
                serde_json::from_str(&features_json).map_err(|e| corrupt(e.to_string()))?;
            let micros: i64 = row.try_get("timestamp")?;
            let timestamp = DateTime::from_timestamp_micros(micros)
                .ok_or_else(|| corrupt(format!("timestamp out of range: {}", micros)))?;

            records.push(PredictionRecord {
                input_features,
                prediction: row.try_get("prediction")?,
                confidence: row.try_get("confidence")?,
                timestamp,
                client_ip: row.try_get("client_ip")?,
                transaction_id,
            });
        }
        Ok(records)
    }
}
