//! HTTP transport for the scoring service.

pub mod error;
pub mod handlers;

pub use error::{ApiError, ApiResult};

use crate::application::fraud_service::FraudDetectionService;
use crate::infrastructure::observability::Metrics;
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<FraudDetectionService>,
    pub metrics: Metrics,
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        // Scoring
        .route("/predict", post(handlers::predict))
        .route("/predict/batch", post(handlers::predict_batch))
        // Ledger
        .route("/stats", get(handlers::stats))
        .route("/recent", get(handlers::recent))
        // Introspection
        .route("/model/info", get(handlers::model_info))
        .route("/metrics", get(handlers::metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
