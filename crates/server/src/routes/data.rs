use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use tracing::debug;

use common::metrics::{record_read, record_write};
use common::types::{DataQuery, DataResponse, WriteRequest, WriteResponse};

use super::AppState;
use crate::errors::ApiError;

fn required_key(key: Option<String>) -> Result<String, ApiError> {
    match key {
        Some(k) if !k.trim().is_empty() => Ok(k),
        _ => Err(ApiError::BadRequest("Key is required".into())),
    }
}

/// Read a bucket. A key that was never written reads as `[]`.
#[utoipa::path(
    get, path = "/api/data", tag = "data",
    params(("key" = String, Query, description = "Bucket key")),
    responses(
        (
            status = 200,
            description = "Stored value, or [] when absent",
            body = crate::openapi::DataResponseDoc
        ),
        (status = 400, description = "Missing key", body = crate::openapi::ErrorResponseDoc),
        (status = 500, description = "Store failure", body = crate::openapi::ErrorResponseDoc)
    )
)]
pub async fn read(
    State(state): State<AppState>,
    query: Result<Query<DataQuery>, QueryRejection>,
) -> Result<Json<DataResponse>, ApiError> {
    let Query(q) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let key = required_key(q.key)?;

    let value = state.kv.get(&key).await?;
    record_read(value.is_some());
    debug!(%key, hit = value.is_some(), "bucket read");
    Ok(Json(value.map(|data| DataResponse { data }).unwrap_or_else(DataResponse::empty)))
}

/// Overwrite a bucket with `data`.
#[utoipa::path(
    post, path = "/api/data", tag = "data",
    request_body = crate::openapi::WriteRequestDoc,
    responses(
        (status = 200, description = "Stored", body = crate::openapi::WriteResponseDoc),
        (
            status = 400,
            description = "Missing key or data",
            body = crate::openapi::ErrorResponseDoc
        ),
        (status = 500, description = "Store failure", body = crate::openapi::ErrorResponseDoc)
    )
)]
pub async fn write(
    State(state): State<AppState>,
    body: Result<Json<WriteRequest>, JsonRejection>,
) -> Result<Json<WriteResponse>, ApiError> {
    let Json(req) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let key = required_key(req.key)?;
    let data = req.data.ok_or_else(|| ApiError::BadRequest("Data is required".into()))?;

    state.kv.set(&key, data).await?;
    record_write();
    debug!(%key, "bucket written");
    Ok(Json(WriteResponse { success: true }))
}
