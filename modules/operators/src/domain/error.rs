use modkit::validation::Violation;
use thiserror::Error;

/// Domain-specific errors using thiserror
///
/// Authentication failures never say whether the email or account exists.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation failed")]
    Validation { violations: Vec<Violation> },

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account is deactivated. Please contact system administrator.")]
    AccountDeactivated,

    #[error("Access denied. No token provided.")]
    MissingToken,

    #[error("Token expired.")]
    TokenExpired,

    #[error("Invalid token.")]
    InvalidToken,

    #[error("Access denied. Super admin role required.")]
    SuperAdminRequired,

    #[error("Admin with this email already exists")]
    EmailTaken { email: String },

    #[error("Admin not found")]
    AdminNotFound { id: String },

    #[error("Cannot deactivate your own account")]
    SelfDeactivation,

    #[error("Credential error: {message}")]
    Crypto { message: String },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn validation(violations: Vec<Violation>) -> Self {
        Self::Validation { violations }
    }

    pub fn email_taken(email: impl Into<String>) -> Self {
        Self::EmailTaken {
            email: email.into(),
        }
    }

    pub fn admin_not_found(id: impl Into<String>) -> Self {
        Self::AdminNotFound { id: id.into() }
    }

    pub fn crypto(message: impl Into<String>) -> Self {
        Self::Crypto {
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    /// True for failures that map to 401.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials
                | Self::AccountDeactivated
                | Self::MissingToken
                | Self::TokenExpired
                | Self::InvalidToken
        )
    }
}
