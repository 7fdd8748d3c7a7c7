use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};

use crate::app::AppState;
use crate::handlers::{json_body, parse_id};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::model::Tenant;
use crate::validation::TenantDraft;

/// GET /api/towers/:id/tenants
pub async fn list(State(state): State<AppState>, Path(tower_id): Path<String>) -> ApiResult<Vec<Tenant>> {
    let tower_id = parse_id(&tower_id, "tower")?;
    Ok(ApiResponse::success(state.towers.tenants(tower_id).await?))
}

/// POST /api/towers/:id/tenants - attach a tenant contract (201)
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(tower_id): Path<String>,
    payload: Result<Json<TenantDraft>, JsonRejection>,
) -> ApiResult<Tenant> {
    let tower_id = parse_id(&tower_id, "tower")?;
    let draft = json_body(payload)?;
    let tenant = state.towers.add_tenant(tower_id, &draft, &user.username).await?;
    Ok(ApiResponse::created(tenant))
}

/// PUT /api/towers/:id/tenants/:tenant_id - replace a tenant contract
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((tower_id, tenant_id)): Path<(String, String)>,
    payload: Result<Json<TenantDraft>, JsonRejection>,
) -> ApiResult<Tenant> {
    let tower_id = parse_id(&tower_id, "tower")?;
    let tenant_id = parse_id(&tenant_id, "tenant")?;
    let draft = json_body(payload)?;
    let tenant = state
        .towers
        .update_tenant(tower_id, tenant_id, &draft, &user.username)
        .await?;
    Ok(ApiResponse::success(tenant))
}

/// DELETE /api/towers/:id/tenants/:tenant_id (204)
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((tower_id, tenant_id)): Path<(String, String)>,
) -> ApiResult<()> {
    let tower_id = parse_id(&tower_id, "tower")?;
    let tenant_id = parse_id(&tenant_id, "tenant")?;
    state.towers.remove_tenant(tower_id, tenant_id, &user.username).await?;
    Ok(ApiResponse::<()>::no_content())
}
