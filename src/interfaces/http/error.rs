//! Error handling

use crate::domain::errors::ScoringError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    /// Scoring pipeline rejected the request
    Scoring(ScoringError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Scoring(ScoringError::InvalidFeatureValue { .. })
            | ApiError::Scoring(ScoringError::BatchTooLarge { .. }) => StatusCode::BAD_REQUEST,
            ApiError::Scoring(ScoringError::ModelNotReady) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Scoring(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = match &self {
            ApiError::Scoring(err) if status.is_client_error() => err.to_string(),
            ApiError::Scoring(ScoringError::ModelNotReady) => {
                "Model not loaded. Please check server logs.".to_string()
            }
            ApiError::Scoring(err) => {
                tracing::error!("Scoring error: {}", err);
                "Prediction failed".to_string()
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<ScoringError> for ApiError {
    fn from(err: ScoringError) -> Self {
        ApiError::Scoring(err)
    }
}
