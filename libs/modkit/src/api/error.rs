use std::sync::atomic::{AtomicBool, Ordering};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Generic text returned instead of internal error detail in production.
pub const INTERNAL_SERVER_ERROR_TEXT: &str = "Internal server error";

static EXPOSE_INTERNAL_DETAILS: AtomicBool = AtomicBool::new(true);

/// Controls whether `ApiError::internal` carries the underlying error text.
/// Set once at startup from the operating environment.
pub fn set_expose_internal_details(expose: bool) {
    EXPOSE_INTERNAL_DETAILS.store(expose, Ordering::Relaxed);
}

pub fn expose_internal_details() -> bool {
    EXPOSE_INTERNAL_DETAILS.load(Ordering::Relaxed)
}

/// Either the full list of violations or a single explanatory sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum ErrorDetails {
    List(Vec<String>),
    Text(String),
}

/// Wire shape of every failed API call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(title = "ErrorBody")]
pub struct ErrorBody {
    pub success: bool,
    /// Short summary, e.g. "Validation failed".
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ErrorDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Error at the API boundary: a status code plus the JSON body to render.
///
/// Modules map their domain errors into this type in `api/rest/error.rs`
/// so handlers can use `?` and still produce consistent bodies.
#[derive(thiserror::Error, Debug, Clone)]
#[error("{status}: {}", body.error)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                success: false,
                error: error.into(),
                details: None,
                message: None,
            },
        }
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.body.details = Some(ErrorDetails::List(details));
        self
    }

    pub fn with_detail_text(mut self, detail: impl Into<String>) -> Self {
        self.body.details = Some(ErrorDetails::Text(detail.into()));
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.body.message = Some(message.into());
        self
    }

    /// 400 "Validation failed" listing every violation.
    pub fn validation(details: Vec<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Validation failed").with_details(details)
    }

    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    pub fn unauthorized(error: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, error)
    }

    pub fn forbidden(error: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, error)
    }

    pub fn not_found(error: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, error)
    }

    pub fn conflict(error: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, error)
    }

    /// 500 with `summary` as the error; `detail` is only exposed outside production.
    pub fn internal(summary: impl Into<String>, detail: impl std::fmt::Display) -> Self {
        let message = if expose_internal_details() {
            detail.to_string()
        } else {
            INTERNAL_SERVER_ERROR_TEXT.to_string()
        };
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, summary).with_message(message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &ErrorBody {
        &self.body
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;
