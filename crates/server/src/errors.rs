use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::{error, warn};

use common::metrics::record_error;
use common::types::ErrorResponse;

/// Failure of a data endpoint call, rendered as `{ "error": ... }`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Store(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<service::kv::KvError> for ApiError {
    fn from(e: service::kv::KvError) -> Self {
        ApiError::Store(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::BadRequest(msg) => {
                record_error("client");
                warn!(error = %msg, "rejected data request");
            }
            ApiError::Store(msg) => {
                record_error("store");
                error!(error = %msg, "bucket store failure");
            }
        }
        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}
