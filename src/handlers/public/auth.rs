use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::app::AppState;
use crate::auth::{check_credentials, generate_jwt, Claims, LoginCheck};
use crate::error::ApiError;
use crate::handlers::json_body;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user: String,
    /// Token lifetime in seconds.
    pub expires_in: u64,
}

/// POST /api/auth/login - Authenticate the administrator and receive a JWT
///
/// Expected Input:
/// ```json
/// { "username": "admin", "password": "..." }
/// ```
///
/// Expected Output (Success):
/// ```json
/// {
///   "success": true,
///   "data": { "token": "eyJhbGciOiJIUzI1NiI...", "user": "admin", "expiresIn": 604800 }
/// }
/// ```
///
/// Wrong credentials are 401. With no admin password configured, login is 503.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let request = json_body(payload)?;
    let security = &state.config.security;

    match check_credentials(request.username.trim(), &request.password, security) {
        LoginCheck::Accepted => {}
        LoginCheck::Rejected => {
            warn!(username = %request.username, "Rejected login attempt");
            return Err(ApiError::unauthorized("Invalid username or password"));
        }
        LoginCheck::Disabled => {
            return Err(ApiError::service_unavailable(
                "Login disabled: no admin password configured",
            ));
        }
    }

    let user = request.username.trim().to_string();
    let token = generate_jwt(&Claims::new(&user, security), security)?;
    info!(username = %user, "Issued session token");

    Ok(ApiResponse::success(LoginResponse {
        token,
        user,
        expires_in: security.jwt_expiry_hours * 3600,
    }))
}
