use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::auth::JwtError;
use crate::database::StoreError;
use crate::filter::FilterError;
use crate::services::{ExportError, ServiceError};
use crate::validation::ValidationErrors;

/// Every failure a handler can return, rendered as the `success: false` envelope.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError {
        message: String,
        field_errors: BTreeMap<String, String>,
    },

    // 401 Unauthorized
    Unauthorized(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// HTTP status and the stable code clients branch on.
    fn kind(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::ValidationError { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            ApiError::InternalServerError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_SERVER_ERROR"),
            ApiError::ServiceUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        self.kind().0
    }

    pub fn error_code(&self) -> &'static str {
        self.kind().1
    }

    /// Client-safe message; internal details are logged, never returned.
    pub fn message(&self) -> &str {
        match self {
            ApiError::ValidationError { message, .. } => message,
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::InternalServerError(msg)
            | ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "success": false,
            "error": self.message(),
            "code": self.error_code()
        });
        if let ApiError::ValidationError { field_errors, .. } = self {
            body["field_errors"] = json!(field_errors);
        }
        body
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => ApiError::not_found(msg),
            StoreError::Conflict(msg) => ApiError::conflict(msg),
            StoreError::Corrupt(msg) => {
                tracing::error!("Corrupt tower record: {}", msg);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
            StoreError::ConfigMissing(what) => {
                tracing::error!("Store misconfigured: {} missing", what);
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            StoreError::Sqlx(sqlx_err) => {
                tracing::error!("Tower store query failed: {}", sqlx_err);
                ApiError::internal_server_error("Database error occurred")
            }
        }
    }
}

impl From<FilterError> for ApiError {
    fn from(err: FilterError) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(err: ValidationErrors) -> Self {
        ApiError::ValidationError {
            message: "Validation failed".to_string(),
            field_errors: err.fields,
        }
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::InvalidToken(msg) => ApiError::unauthorized(msg),
            JwtError::InvalidSecret => {
                tracing::error!("JWT secret not configured");
                ApiError::service_unavailable("Authentication is not configured")
            }
            JwtError::TokenGeneration(msg) => {
                tracing::error!("JWT generation failed: {}", msg);
                ApiError::internal_server_error("Failed to issue token")
            }
        }
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        tracing::error!("CSV export failed: {}", err);
        ApiError::internal_server_error("Failed to export towers")
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Store(e) => e.into(),
            ServiceError::Validation(e) => e.into(),
            ServiceError::Export(e) => e.into(),
            ServiceError::BadRequest(msg) => ApiError::bad_request(msg),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn store_errors_map_to_status() {
        let missing: ApiError = StoreError::tower_not_found(Uuid::nil()).into();
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);

        let dup: ApiError = StoreError::duplicate_code("TWR-1").into();
        assert_eq!(dup.status_code(), StatusCode::CONFLICT);
        assert_eq!(dup.to_json()["code"], "CONFLICT");
    }

    #[test]
    fn validation_errors_carry_fields() {
        let mut fields = BTreeMap::new();
        fields.insert("towerCode".to_string(), "Tower code is required".to_string());
        let err: ApiError = ValidationErrors { fields }.into();

        let body = err.to_json();
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["field_errors"]["towerCode"], "Tower code is required");
    }
}
