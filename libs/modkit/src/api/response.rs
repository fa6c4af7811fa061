use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Page navigation block attached to list responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_count: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl Pagination {
    /// Derive navigation flags from a 1-based page number and a positive page size.
    pub fn new(current_page: u64, page_size: u64, total_count: u64) -> Self {
        let total_pages = total_count.div_ceil(page_size.max(1));
        Self {
            current_page,
            total_pages,
            total_count,
            has_next_page: current_page < total_pages,
            has_prev_page: current_page > 1,
        }
    }
}

/// Success envelope: `{"success": true, "message"?: .., "data": .., "pagination"?: ..}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data,
            pagination: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn paginated(data: T, pagination: Pagination) -> Self {
        Self {
            pagination: Some(pagination),
            ..Self::ok(data)
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    /// 201 Created + JSON
    pub fn created(self) -> Response {
        (StatusCode::CREATED, Json(self)).into_response()
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_second_page_of_twenty_five() {
        let p = Pagination::new(2, 10, 25);
        assert_eq!(p.total_pages, 3);
        assert!(p.has_next_page);
        assert!(p.has_prev_page);

        let last = Pagination::new(3, 10, 25);
        assert!(!last.has_next_page);
    }

    #[test]
    fn pagination_of_empty_set() {
        let p = Pagination::new(1, 50, 0);
        assert_eq!(p.total_pages, 0);
        assert!(!p.has_next_page);
        assert!(!p.has_prev_page);
    }

    #[test]
    fn envelope_omits_absent_fields() {
        let body = serde_json::to_value(ApiResponse::ok(vec![1, 2])).unwrap();
        assert_eq!(body, serde_json::json!({ "success": true, "data": [1, 2] }));

        let body = serde_json::to_value(
            ApiResponse::paginated(Vec::<u8>::new(), Pagination::new(1, 10, 0))
                .with_message("listed"),
        )
        .unwrap();
        assert_eq!(body["message"], "listed");
        assert_eq!(body["pagination"]["totalPages"], 0);
        assert_eq!(body["pagination"]["hasPrevPage"], false);
    }

    #[test]
    fn created_sets_status() {
        let resp = ApiResponse::ok("x").created();
        assert_eq!(resp.status(), StatusCode::CREATED);
    }
}
