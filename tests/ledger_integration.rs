use chrono::{DateTime, Duration as ChronoDuration, Utc};
use fraud_scorer::application::ledger::PredictionLedger;
use fraud_scorer::domain::errors::StorageError;
use fraud_scorer::domain::ml::{FeatureInput, FeatureVector, RawFeature};
use fraud_scorer::domain::prediction::{AggregateStats, PredictionRecord, Score};
use fraud_scorer::domain::repositories::PredictionRepository;
use fraud_scorer::infrastructure::persistence::{Database, SqlitePredictionRepository};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

async fn open_database(dir: &TempDir) -> Database {
    let url = format!("sqlite://{}", dir.path().join("ledger/predictions.db").display());
    Database::new(&url, 5, Duration::from_secs(5))
        .await
        .expect("Failed to open test database")
}

fn base_time() -> DateTime<Utc> {
    // Whole microseconds so stored timestamps compare equal
    DateTime::from_timestamp_micros(1_700_000_000_123_456).unwrap()
}

fn record(id: &str, fraud: bool, confidence: f64, at: DateTime<Utc>) -> PredictionRecord {
    let mut input = FeatureInput::new();
    input.insert("amount".to_string(), RawFeature::Number(150.25));
    input.insert("v14".to_string(), RawFeature::Number(-2.5));
    let features = FeatureVector::from_input(&input).unwrap();
    PredictionRecord::new(
        id.to_string(),
        &features,
        Score {
            is_fraud: fraud,
            confidence,
        },
        at,
        Some("192.168.1.20".to_string()),
    )
}

#[tokio::test]
async fn test_sqlite_stats_scenario() {
    let dir = TempDir::new().unwrap();
    let db = open_database(&dir).await;
    let repo = SqlitePredictionRepository::new(db.pool.clone());

    assert_eq!(repo.stats().await.unwrap(), AggregateStats::default());

    let now = base_time();
    repo.insert(&record("txn_1", true, 0.95, now)).await.unwrap();
    repo.insert(&record("txn_2", false, 0.2, now)).await.unwrap();
    repo.insert(&record("txn_3", true, 0.99, now)).await.unwrap();

    let stats = repo.stats().await.unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.fraud_count, 2);
    assert_eq!(stats.safe_count, 1);
    assert!((stats.fraud_percentage - 66.666).abs() < 0.01);
    assert!((stats.avg_confidence - 0.7133).abs() < 0.001);

    db.close().await;
}

#[tokio::test]
async fn test_sqlite_record_round_trip() {
    let dir = TempDir::new().unwrap();
    let db = open_database(&dir).await;
    let repo = SqlitePredictionRepository::new(db.pool.clone());

    let original = record("txn_round", true, 0.87, base_time());
    repo.insert(&original).await.unwrap();

    let stored = repo.find_recent(1).await.unwrap();
    assert_eq!(stored, vec![original]);
    assert_eq!(stored[0].input_features.len(), 30);
    assert_eq!(stored[0].input_features["v14"], -2.5);
}

#[tokio::test]
async fn test_sqlite_recent_newest_first() {
    let dir = TempDir::new().unwrap();
    let db = open_database(&dir).await;
    let repo = SqlitePredictionRepository::new(db.pool.clone());

    let t1 = base_time();
    let t2 = t1 + ChronoDuration::seconds(5);
    let t3 = t1 + ChronoDuration::seconds(10);
    repo.insert(&record("t2", false, 0.1, t2)).await.unwrap();
    repo.insert(&record("t3", false, 0.1, t3)).await.unwrap();
    repo.insert(&record("t1", false, 0.1, t1)).await.unwrap();

    let ids: Vec<String> = repo
        .find_recent(2)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.transaction_id)
        .collect();
    assert_eq!(ids, vec!["t3", "t2"]);
    assert_eq!(repo.find_recent(100).await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_sqlite_duplicate_identifier() {
    let dir = TempDir::new().unwrap();
    let db = open_database(&dir).await;
    let repo = SqlitePredictionRepository::new(db.pool.clone());

    repo.insert(&record("txn_dup", true, 0.9, base_time())).await.unwrap();
    let err = repo
        .insert(&record("txn_dup", false, 0.1, base_time()))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::DuplicateIdentifier { ref identifier } if identifier == "txn_dup"));
    assert_eq!(repo.stats().await.unwrap().total, 1);
}

#[tokio::test]
async fn test_records_survive_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let db = open_database(&dir).await;
        let repo = SqlitePredictionRepository::new(db.pool.clone());
        repo.insert(&record("txn_keep", true, 0.91, base_time())).await.unwrap();
        db.close().await;
    }

    let db = open_database(&dir).await;
    let repo = SqlitePredictionRepository::new(db.pool.clone());
    let recent = repo.find_recent(10).await.unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].transaction_id, "txn_keep");
}

#[tokio::test]
async fn test_concurrent_ledger_writes() {
    let dir = TempDir::new().unwrap();
    let db = open_database(&dir).await;
    let ledger = Arc::new(PredictionLedger::new(
        Arc::new(SqlitePredictionRepository::new(db.pool.clone())),
        Duration::from_secs(10),
    ));

    let writes = (0..40).map(|i| {
        let ledger = ledger.clone();
        async move {
            let at = base_time() + ChronoDuration::milliseconds(i);
            ledger
                .record(record(&format!("txn_{:02}", i), i % 4 == 0, 0.5, at))
                .await
        }
    });
    let results = join_all(writes).await;
    assert!(results.iter().all(Option::is_some));

    let stats = ledger.stats().await;
    assert_eq!(stats.total, 40);
    assert_eq!(stats.fraud_count, 10);
    assert_eq!(stats.safe_count, 30);
    assert_eq!(ledger.recent(1).await[0].transaction_id, "txn_39");
}

#[tokio::test]
async fn test_ledger_degrades_after_pool_closed() {
    let dir = TempDir::new().unwrap();
    let db = open_database(&dir).await;
    let ledger = PredictionLedger::new(
        Arc::new(SqlitePredictionRepository::new(db.pool.clone())),
        Duration::from_secs(1),
    );
    assert!(ledger.record(record("txn_before", true, 0.9, base_time())).await.is_some());

    db.close().await;

    assert!(ledger.record(record("txn_after", true, 0.9, base_time())).await.is_none());
    assert!(ledger.recent(5).await.is_empty());
    assert_eq!(ledger.stats().await, AggregateStats::default());
}
