use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::types::ErrorBody;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::error;

use crate::router::RouteError;

/// Client-facing failure of an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: &str) -> Self { Self::BadRequest(msg.to_string()) }
    pub fn not_found(msg: &str) -> Self { Self::NotFound(msg.to_string()) }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Db(msg) => ApiError::Internal(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, Json(ErrorBody::new(msg))).into_response(),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, Json(ErrorBody::new(msg))).into_response(),
            ApiError::Internal(detail) => {
                error!(error = %detail, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody::with_message("Internal server error", "An unexpected error occurred")),
                )
                    .into_response()
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("route table: {0}")]
    Routes(#[from] RouteError),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
