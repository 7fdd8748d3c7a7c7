use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::app::AppState;

/// GET / - service name, version and route overview
pub async fn root(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Tower Admin API",
            "version": env!("CARGO_PKG_VERSION"),
            "environment": state.config.environment,
            "store": state.towers.backend(),
            "endpoints": {
                "health": "/health (public)",
                "login": "/api/auth/login (public - token acquisition)",
                "auth": "/api/auth/whoami (protected)",
                "towers": "/api/towers[/:id] (protected)",
                "search": "/api/towers/search?q= (protected)",
                "bulk": "/api/towers/bulk (protected)",
                "export": "/api/towers/export (protected)",
                "tenants": "/api/towers/:id/tenants[/:tenant_id] (protected)",
                "dashboard": "/api/dashboard/metrics (protected)",
            }
        }
    }))
}

/// GET /health - store reachability
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();
    let store = state.towers.backend();

    match state.towers.health().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "store": store
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "store unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "store": store
                    }
                })),
            )
        }
    }
}
