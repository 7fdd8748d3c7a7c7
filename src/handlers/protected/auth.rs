use axum::Extension;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::middleware::{ApiResponse, ApiResult, AuthUser};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WhoAmI {
    pub username: String,
    pub issued_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// GET /api/auth/whoami - Subject and lifetime of the presented token
pub async fn whoami(Extension(user): Extension<AuthUser>) -> ApiResult<WhoAmI> {
    Ok(ApiResponse::success(WhoAmI {
        username: user.username,
        issued_at: DateTime::from_timestamp(user.issued_at, 0),
        expires_at: DateTime::from_timestamp(user.expires_at, 0),
    }))
}
