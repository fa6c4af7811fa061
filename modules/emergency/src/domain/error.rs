use modkit::validation::Violation;
use thiserror::Error;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation failed")]
    Validation { violations: Vec<Violation> },

    #[error("Status is required")]
    StatusRequired,

    #[error("Invalid status: {value}")]
    InvalidStatus { value: String },

    #[error("Invalid priority: {value}")]
    InvalidPriority { value: String },

    #[error("Invalid sort field: {value}")]
    InvalidSortField { value: String },

    #[error("Invalid bounds format: {reason}")]
    InvalidBounds { reason: String },

    #[error("Emergency request not found")]
    RequestNotFound { id: String },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn validation(violations: Vec<Violation>) -> Self {
        Self::Validation { violations }
    }

    pub fn invalid_status(value: impl Into<String>) -> Self {
        Self::InvalidStatus {
            value: value.into(),
        }
    }

    pub fn invalid_priority(value: impl Into<String>) -> Self {
        Self::InvalidPriority {
            value: value.into(),
        }
    }

    pub fn invalid_sort_field(value: impl Into<String>) -> Self {
        Self::InvalidSortField {
            value: value.into(),
        }
    }

    pub fn invalid_bounds(reason: impl Into<String>) -> Self {
        Self::InvalidBounds {
            reason: reason.into(),
        }
    }

    pub fn request_not_found(id: impl Into<String>) -> Self {
        Self::RequestNotFound { id: id.into() }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}
