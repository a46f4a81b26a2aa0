use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::QueryRejection;
use thiserror::Error;
use tracing::error;

use crate::models::UnknownLabel;
use crate::webhook::PayloadError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
    #[error("Maintenance request not found")]
    NotFound,
    #[error(transparent)]
    InvalidPayload(#[from] PayloadError),
    #[error("Invalid status: {0}")]
    InvalidStatus(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.to_string())
    }
}

impl From<UnknownLabel> for ApiError {
    fn from(err: UnknownLabel) -> Self {
        ApiError::InvalidStatus(err.value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Database(err) => {
                error!("Database error: {:#}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Maintenance request not found".to_string()),
            ApiError::InvalidPayload(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            ApiError::InvalidStatus(value) => (StatusCode::BAD_REQUEST, format!("Invalid status: {}", value)),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
