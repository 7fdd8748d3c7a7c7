use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::auth::{validate_jwt, Claims};
use crate::error::ApiError;

/// The caller behind a validated token.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub username: String,
    pub issued_at: i64,
    pub expires_at: i64,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            username: claims.sub,
            issued_at: claims.iat,
            expires_at: claims.exp,
        }
    }
}

/// Require a valid bearer token and expose its subject as [`AuthUser`]
/// to downstream handlers.
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&headers).map_err(|reason| {
        tracing::debug!("Rejected {} {}: {}", request.method(), request.uri().path(), reason);
        ApiError::unauthorized(reason)
    })?;
    let claims = validate_jwt(token, &state.config.security)?;

    request.extensions_mut().insert(AuthUser::from(claims));
    Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, &'static str> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or("Authentication required")?
        .to_str()
        .map_err(|_| "Authorization header is not valid text")?;

    let token = value
        .strip_prefix("Bearer ")
        .ok_or("Authorization header must carry a Bearer token")?
        .trim();
    if token.is_empty() {
        return Err("Bearer token is empty");
    }
    Ok(token)
}
