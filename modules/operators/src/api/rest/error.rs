use modkit::api::ApiError;
use modkit::validation::messages;

use crate::domain::error::DomainError;

/// Map a domain error to the JSON error body.
pub fn map_domain_error(e: &DomainError) -> ApiError {
    match e {
        DomainError::Validation { violations } => ApiError::validation(messages(violations)),
        DomainError::InvalidCredentials
        | DomainError::AccountDeactivated
        | DomainError::MissingToken
        | DomainError::TokenExpired
        | DomainError::InvalidToken => ApiError::unauthorized(e.to_string()),
        DomainError::SuperAdminRequired => ApiError::forbidden(e.to_string()),
        DomainError::EmailTaken { .. } => ApiError::conflict(e.to_string()),
        DomainError::AdminNotFound { .. } => ApiError::not_found(e.to_string()),
        DomainError::SelfDeactivation => ApiError::bad_request(e.to_string()),
        DomainError::Crypto { .. } | DomainError::Database { .. } => {
            // Log the internal error details; the body only carries them outside production
            tracing::error!(error = ?e, "operators internal error");
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

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use modkit::validation::Violation;

    #[test]
    fn statuses_follow_taxonomy() {
        let cases = [
            (
                DomainError::validation(vec![Violation::new("email", "Email is required")]),
                StatusCode::BAD_REQUEST,
            ),
            (DomainError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (DomainError::TokenExpired, StatusCode::UNAUTHORIZED),
            (DomainError::SuperAdminRequired, StatusCode::FORBIDDEN),
            (DomainError::email_taken("a@b.co"), StatusCode::CONFLICT),
            (DomainError::admin_not_found("x"), StatusCode::NOT_FOUND),
            (DomainError::SelfDeactivation, StatusCode::BAD_REQUEST),
            (DomainError::database("boom"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(map_domain_error(&err).status(), status, "{err}");
        }
    }

    #[test]
    fn auth_messages_are_exact() {
        assert_eq!(
            map_domain_error(&DomainError::MissingToken).body().error,
            "Access denied. No token provided."
        );
        assert_eq!(
            map_domain_error(&DomainError::InvalidCredentials).body().error,
            "Invalid email or password"
        );
    }
}
