// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth)    -> /, /health, /api/auth/login
// Protected (JWT)     -> every other /api/* route

pub mod protected;
pub mod public;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Json, Query};
use uuid::Uuid;

use crate::error::ApiError;

/// Unwrap a JSON body, turning extractor rejections into the error envelope.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

pub(crate) fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

pub(crate) fn parse_id(raw: &str, what: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::bad_request(format!("Invalid {what} id '{raw}'")))
}

pub(crate) fn parse_ids(raw: &[String]) -> Result<Vec<Uuid>, ApiError> {
    raw.iter().map(|id| parse_id(id, "tower")).collect()
}
