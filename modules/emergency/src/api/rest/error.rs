use modkit::api::ApiError;
use modkit::validation::messages;

use crate::contract::model::{Priority, RequestStatus, SortField};
use crate::domain::error::DomainError;

fn one_of<const N: usize, T: Copy>(all: [T; N], name: fn(T) -> &'static str) -> String {
    all.map(name).join(", ")
}

/// Map a domain error to the JSON error body.
pub fn map_domain_error(e: &DomainError) -> ApiError {
    match e {
        DomainError::Validation { violations } => ApiError::validation(messages(violations)),
        DomainError::StatusRequired => ApiError::bad_request("Status is required"),
        DomainError::InvalidStatus { .. } => ApiError::bad_request("Invalid status")
            .with_detail_text(format!(
                "Status must be one of: {}",
                one_of(RequestStatus::ALL, RequestStatus::as_str)
            )),
        DomainError::InvalidPriority { .. } => ApiError::bad_request("Invalid priority")
            .with_detail_text(format!(
                "Priority must be one of: {}",
                one_of(Priority::ALL, Priority::as_str)
            )),
        DomainError::InvalidSortField { .. } => ApiError::bad_request("Invalid sort field")
            .with_detail_text(format!(
                "sortBy must be one of: {}",
                one_of(SortField::ALL, SortField::as_str)
            )),
        DomainError::InvalidBounds { reason } => {
            tracing::debug!(%reason, "rejected bounds");
            ApiError::bad_request("Invalid bounds format").with_message(
                "Bounds should be a JSON object with north, south, east, west properties",
            )
        }
        DomainError::RequestNotFound { .. } => ApiError::not_found("Emergency request not found"),
        DomainError::Database { .. } => {
            // Log the internal error details; the body only carries them outside production
            tracing::error!(error = ?e, "emergency internal error");
            ApiError::internal("Something went wrong!", e)
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        map_domain_error(&e)
    }
}

/// 400 for a malformed path identifier.
pub fn invalid_id() -> ApiError {
    ApiError::bad_request("Invalid ID format")
}
