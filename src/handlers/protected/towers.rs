use axum::{
    body::Bytes,
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::error::ApiError;
use crate::filter::{ListParams, TowerFilter};
use crate::handlers::{json_body, parse_id, parse_ids, query_params};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::model::{Tower, TowerDetail};
use crate::validation::TowerDraft;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct IdsRequest {
    pub ids: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExportRequest {
    pub ids: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct BulkDeleteResponse {
    pub deleted: u64,
}

/// GET /api/towers - paged, sorted and filtered listing
///
/// Query: `page`, `limit`, `sortBy`, `sortOrder`, `status`, `type`, `q`.
/// The envelope carries `total`, `page` and `limit` next to `data`.
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Vec<Tower>> {
    let params = query_params(query)?;
    let filter = TowerFilter::from_params(&params, &state.config.listing)?;
    let page = state.towers.list(&filter).await?;
    Ok(ApiResponse::paged(page))
}

/// GET /api/towers/search?q= - match code, address or description
pub async fn search(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> ApiResult<Vec<Tower>> {
    let q = query_params(query)?.q.unwrap_or_default();
    let towers = state.towers.search(&q, state.config.listing.search_limit).await?;
    Ok(ApiResponse::success(towers))
}

/// POST /api/towers/export - CSV of the given towers, or of all towers
///
/// Expected Input (optional):
/// ```json
/// { "ids": ["9b2e...", "41c0..."] }
/// ```
pub async fn export(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    let request: ExportRequest = if body.iter().all(u8::is_ascii_whitespace) {
        ExportRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| ApiError::bad_request(format!("Invalid export request: {e}")))?
    };

    let ids = request.ids.as_deref().map(parse_ids).transpose()?;
    let csv = state.towers.export(ids.as_deref()).await?;
    let filename = format!("towers-{}.csv", chrono::Utc::now().format("%Y-%m-%d"));

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{filename}\"")),
        ],
        csv,
    )
        .into_response())
}

/// DELETE /api/towers/bulk - delete several towers at once
///
/// Expected Input:
/// ```json
/// { "ids": ["9b2e...", "41c0..."] }
/// ```
///
/// Unknown ids are skipped; `deleted` counts what was actually removed.
pub async fn bulk_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<IdsRequest>, JsonRejection>,
) -> ApiResult<BulkDeleteResponse> {
    let ids = parse_ids(&json_body(payload)?.ids)?;
    let deleted = state.towers.delete_many(&ids, &user.username).await?;
    Ok(ApiResponse::success(BulkDeleteResponse { deleted }))
}

/// POST /api/towers - create a tower (201)
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<TowerDraft>, JsonRejection>,
) -> ApiResult<TowerDetail> {
    let draft = json_body(payload)?;
    let tower = state.towers.create(&draft, &user.username).await?;
    Ok(ApiResponse::created(tower))
}

/// GET /api/towers/:id - tower with tenants and `totalMonthlyRevenue`
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<TowerDetail> {
    let id = parse_id(&id, "tower")?;
    Ok(ApiResponse::success(state.towers.get(id).await?))
}

/// PUT /api/towers/:id - merge the given fields into the tower
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<TowerDraft>, JsonRejection>,
) -> ApiResult<TowerDetail> {
    let id = parse_id(&id, "tower")?;
    let draft = json_body(payload)?;
    let tower = state.towers.update(id, &draft, &user.username).await?;
    Ok(ApiResponse::success(tower))
}

/// DELETE /api/towers/:id - delete a tower and its tenants (204)
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id = parse_id(&id, "tower")?;
    state.towers.delete(id, &user.username).await?;
    Ok(ApiResponse::<()>::no_content())
}
