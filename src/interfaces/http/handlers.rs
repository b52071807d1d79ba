//! Request handlers

use super::AppState;
use super::error::ApiResult;
use crate::application::fraud_service::{BatchOutcome, PredictionOutcome};
use crate::domain::ml::FeatureInput;
use crate::domain::ml::feature_registry::{FEATURE_COUNT, FEATURE_NAMES};
use crate::domain::prediction::{AggregateStats, PredictionRecord};
use axum::{
    Json,
    extract::{ConnectInfo, Query, State},
    http::header,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

pub const DEFAULT_RECENT_LIMIT: usize = 10;
pub const MAX_RECENT_LIMIT: usize = 100;

#[derive(Serialize)]
pub struct RootResponse {
    service: &'static str,
    version: &'static str,
    status: &'static str,
}

pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        service: "Credit Card Fraud Detection API",
        version: env!("CARGO_PKG_VERSION"),
        status: "running",
    })
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    model_loaded: bool,
    scaler_loaded: bool,
    database_connected: bool,
    version: &'static str,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let engine = state.service.engine();
    Json(HealthResponse {
        status: if engine.is_ready() { "healthy" } else { "unhealthy" },
        model_loaded: engine.is_ready(),
        scaler_loaded: engine.scaler_loaded(),
        database_connected: state.service.ledger().is_connected(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

fn origin(connect_info: Option<ConnectInfo<SocketAddr>>) -> Option<String> {
    connect_info.map(|ConnectInfo(addr)| addr.ip().to_string())
}

/// Score a single transaction
pub async fn predict(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    Json(input): Json<FeatureInput>,
) -> ApiResult<Json<PredictionOutcome>> {
    let outcome = state.service.predict(&input, origin(connect_info)).await?;
    Ok(Json(outcome))
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub transactions: Vec<FeatureInput>,
}

/// Score up to `MAX_BATCH_SIZE` transactions
pub async fn predict_batch(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    Json(request): Json<BatchRequest>,
) -> ApiResult<Json<BatchOutcome>> {
    let outcome = state
        .service
        .predict_batch(&request.transactions, origin(connect_info))
        .await?;
    Ok(Json(outcome))
}

#[derive(Serialize)]
pub struct StatsResponse {
    status: &'static str,
    data: AggregateStats,
    timestamp: DateTime<Utc>,
}

pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        status: "success",
        data: state.service.ledger().stats().await,
        timestamp: Utc::now(),
    })
}

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<i64>,
}

impl RecentQuery {
    /// Requested limit, or the default when it falls outside `1..=MAX_RECENT_LIMIT`.
    pub fn effective_limit(&self) -> usize {
        match self.limit {
            Some(n) if n >= 1 && n as usize <= MAX_RECENT_LIMIT => n as usize,
            _ => DEFAULT_RECENT_LIMIT,
        }
    }
}

#[derive(Serialize)]
pub struct RecentResponse {
    status: &'static str,
    count: usize,
    data: Vec<PredictionRecord>,
}

pub async fn recent(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> Json<RecentResponse> {
    let data = state.service.ledger().recent(query.effective_limit()).await;
    Json(RecentResponse {
        status: "success",
        count: data.len(),
        data,
    })
}

#[derive(Serialize)]
pub struct ModelInfo {
    model_loaded: bool,
    scaler_loaded: bool,
    feature_count: usize,
    features: &'static [&'static str],
    model_kind: Option<&'static str>,
    model_name: Option<String>,
}

#[derive(Serialize)]
pub struct ModelInfoResponse {
    status: &'static str,
    data: ModelInfo,
}

pub async fn model_info(State(state): State<AppState>) -> Json<ModelInfoResponse> {
    let engine = state.service.engine();
    Json(ModelInfoResponse {
        status: "success",
        data: ModelInfo {
            model_loaded: engine.is_ready(),
            scaler_loaded: engine.scaler_loaded(),
            feature_count: FEATURE_COUNT,
            features: &FEATURE_NAMES,
            model_kind: engine.model_kind(),
            model_name: engine.model_name().map(str::to_string),
        },
    })
}

pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
