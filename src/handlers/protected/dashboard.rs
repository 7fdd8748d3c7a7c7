use axum::extract::State;

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::DashboardMetrics;

/// GET /api/dashboard/metrics - fleet totals, breakdowns and recent activity
pub async fn metrics(State(state): State<AppState>) -> ApiResult<DashboardMetrics> {
    let metrics = state.towers.dashboard().await?;
    Ok(ApiResponse::success(metrics))
}
