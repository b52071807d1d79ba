//! Fraud scoring HTTP server
//!
//! Loads the scoring artifacts, connects the prediction ledger and serves
//! the scoring API until Ctrl+C.
//!
//! # Usage
//! ```sh
//! MODEL_PATH=model/fraud_model.onnx PORT=8000 cargo run --bin server
//! ```
//!
//! # Environment Variables
//! - `MODEL_PATH` / `SCALER_PATH` - Artifact locations
//! - `DATABASE_URL` - SQLite ledger (default: sqlite://data/predictions.db)
//! - `STORAGE_ENABLED` - Disable to run with a detached ledger (default: true)
//! - `LOG_FORMAT` - `pretty` or `json` (default: pretty)

use anyhow::{Context, Result};
use fraud_scorer::application::fraud_service::FraudDetectionService;
use fraud_scorer::application::ledger::PredictionLedger;
use fraud_scorer::application::ml::ScoringEngine;
use fraud_scorer::config::{Config, StorageEnvConfig};
use fraud_scorer::infrastructure::observability::{Metrics, init_tracing};
use fraud_scorer::infrastructure::persistence::{Database, SqlitePredictionRepository};
use fraud_scorer::interfaces::http::{AppState, create_router};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.observability.log_format);

    info!("Fraud scoring server {} starting...", env!("CARGO_PKG_VERSION"));

    let metrics = Metrics::new().context("Failed to register metrics")?;

    // Scoring artifacts are loaded once; the engine is read-only afterwards
    let mut engine = ScoringEngine::new();
    if let Err(e) = engine.load(&config.model.model_path) {
        error!("Failed to load model: {}", e);
        return Err(e).context("ONNX scoring model is required to serve predictions");
    }

    if config.model.scaler_path.exists() {
        engine
            .load_scaler(&config.model.scaler_path)
            .context("Scaler artifact is present but unreadable")?;
    } else {
        warn!(
            "Scaler not found at {:?}; time and amount will be scored unscaled",
            config.model.scaler_path
        );
    }
    metrics.set_model_loaded(engine.is_ready());

    let (mut ledger, database) = connect_ledger(&config.storage).await;
    let mut service_metrics = None;
    if config.observability.enabled {
        ledger = ledger.with_metrics(metrics.clone());
        service_metrics = Some(metrics.clone());
    }
    info!("Prediction ledger backend: {}", ledger.backend());

    let mut service = FraudDetectionService::new(Arc::new(engine), Arc::new(ledger));
    if let Some(m) = service_metrics {
        service = service.with_metrics(m);
    }

    let app = create_router(AppState {
        service: Arc::new(service),
        metrics,
    });

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context(format!("Failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    info!("Shutdown complete. Closing ledger...");
    if let Some(db) = database {
        db.close().await;
    }
    Ok(())
}

/// Connect the configured store. A failed connection leaves the ledger detached.
async fn connect_ledger(storage: &StorageEnvConfig) -> (PredictionLedger, Option<Database>) {
    if !storage.enabled {
        info!("Storage disabled; predictions will not be persisted");
        return (PredictionLedger::detached(), None);
    }

    match Database::new(&storage.database_url, storage.max_connections, storage.timeout()).await {
        Ok(db) => {
            let repository = SqlitePredictionRepository::new(db.pool.clone());
            (
                PredictionLedger::new(Arc::new(repository), storage.timeout()),
                Some(db),
            )
        }
        Err(e) => {
            warn!("Ledger store unavailable, running detached: {:#}", e);
            (PredictionLedger::detached(), None)
        }
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received."),
        Err(e) => {
            error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
