use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::types::Page;

/// Paging totals attached next to `data` on list responses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageMeta {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

/// A handler's successful result, rendered as `{"success": true, "data": ...}`.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status: StatusCode,
    pub page: Option<PageMeta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self::with_status(data, StatusCode::OK)
    }

    pub fn with_status(data: T, status: StatusCode) -> Self {
        Self { data, status, page: None }
    }

    pub fn created(data: T) -> Self {
        Self::with_status(data, StatusCode::CREATED)
    }

    /// Empty body; used by deletes.
    pub fn no_content() -> ApiResponse<()> {
        ApiResponse::with_status((), StatusCode::NO_CONTENT)
    }
}

impl<T: Serialize> ApiResponse<Vec<T>> {
    pub fn paged(page: Page<T>) -> Self {
        let meta = PageMeta {
            total: page.total,
            page: page.page,
            limit: page.limit,
        };
        Self {
            page: Some(meta),
            ..Self::success(page.items)
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    fn envelope(&self) -> Result<Value, serde_json::Error> {
        let mut body = json!({ "success": true, "data": serde_json::to_value(&self.data)? });
        if let Some(meta) = self.page {
            body["total"] = json!(meta.total);
            body["page"] = json!(meta.page);
            body["limit"] = json!(meta.limit);
        }
        Ok(body)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        if self.status == StatusCode::NO_CONTENT {
            return self.status.into_response();
        }

        match self.envelope() {
            Ok(body) => (self.status, Json(body)).into_response(),
            Err(e) => {
                tracing::error!("Failed to serialize {} response: {}", self.status, e);
                ApiError::internal_server_error("Failed to serialize response").into_response()
            }
        }
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paged_envelope_carries_totals() {
        let page = Page { items: vec!["a", "b"], total: 7, page: 2, limit: 2 };
        let body = ApiResponse::paged(page).envelope().unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"], json!(["a", "b"]));
        assert_eq!(body["total"], 7);
        assert_eq!(body["page"], 2);
    }

    #[test]
    fn no_content_has_empty_body() {
        let response = ApiResponse::<()>::no_content().into_response();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}
