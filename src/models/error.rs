use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Why a single location item was rejected. Reported back per item, the rest
/// of the batch keeps going.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("location item is null")]
    NullItem,
    #[error("location item is not an object")]
    MalformedItem,
    #[error("invalid latitude '{0}'")]
    InvalidLatitude(String),
    #[error("invalid longitude '{0}'")]
    InvalidLongitude(String),
    #[error("{axis} {value} is out of range [-{limit}, {limit}]")]
    CoordinateOutOfRange {
        axis: &'static str,
        value: f64,
        limit: f64,
    },
    #[error("invalid datetime '{0}'")]
    InvalidDateTime(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable at {}: {source}", path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not encode log record: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("location logger is not running")]
    LoggerClosed,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (code, status) = match &self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "fail"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "fail"),
            ApiError::Storage(e) => {
                error!("Storage failure: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "error")
            }
        };
        let body = ErrorResponse {
            status,
            message: self.to_string(),
        };
        (code, Json(body)).into_response()
    }
}
