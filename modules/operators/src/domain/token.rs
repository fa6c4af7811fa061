//! HS256 JWT issuance and verification.

use chrono::Utc;
use jsonwebtoken::{errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::contract::model::Admin;
use crate::domain::error::DomainError;

/// JWT claims embedded in every access token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Admin id.
    pub sub: String,
    /// Role at issuance time; authorization re-reads the stored role.
    pub role: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    ttl_secs: i64,
}

impl TokenIssuer {
    pub fn new(secret: &str, issuer: impl Into<String>, ttl_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.into(),
            ttl_secs: i64::try_from(ttl_secs).unwrap_or(i64::MAX),
        }
    }

    pub fn issue(&self, admin: &Admin) -> Result<String, DomainError> {
        self.issue_at(admin, Utc::now().timestamp())
    }

    pub(crate) fn issue_at(&self, admin: &Admin, issued_at: i64) -> Result<String, DomainError> {
        let claims = Claims {
            sub: admin.id.to_string(),
            role: admin.role.as_str().to_string(),
            iss: self.issuer.clone(),
            iat: issued_at,
            exp: issued_at.saturating_add(self.ttl_secs),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| DomainError::crypto(format!("JWT encode: {e}")))
    }

    /// Check signature, expiry and issuer.
    pub fn verify(&self, token: &str) -> Result<Claims, DomainError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss"]);

        jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => DomainError::TokenExpired,
                _ => {
                    tracing::debug!(error = %e, "token rejected");
                    DomainError::InvalidToken
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::model::{AdminId, Role};

    fn admin() -> Admin {
        let now = Utc::now();
        Admin {
            id: AdminId::generate(),
            email: "ops@example.com".into(),
            name: "Ops".into(),
            role: Role::SuperAdmin,
            is_active: true,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn jwt_roundtrip() {
        let issuer = TokenIssuer::new("secret", "sos-test", 3600);
        let a = admin();
        let claims = issuer.verify(&issuer.issue(&a).unwrap()).unwrap();
        assert_eq!(claims.sub, a.id.to_string());
        assert_eq!(claims.role, "super_admin");
        assert_eq!(claims.iss, "sos-test");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn expired_token_is_distinguished() {
        let issuer = TokenIssuer::new("secret", "sos-test", 60);
        let stale = issuer
            .issue_at(&admin(), Utc::now().timestamp() - 7200)
            .unwrap();
        assert!(matches!(
            issuer.verify(&stale),
            Err(DomainError::TokenExpired)
        ));
    }

    #[test]
    fn foreign_secret_or_issuer_is_invalid() {
        let ours = TokenIssuer::new("secret", "sos-test", 3600);
        let other_secret = TokenIssuer::new("other", "sos-test", 3600);
        let other_issuer = TokenIssuer::new("secret", "someone-else", 3600);
        let a = admin();

        assert!(matches!(
            ours.verify(&other_secret.issue(&a).unwrap()),
            Err(DomainError::InvalidToken)
        ));
        assert!(matches!(
            ours.verify(&other_issuer.issue(&a).unwrap()),
            Err(DomainError::InvalidToken)
        ));
        assert!(matches!(
            ours.verify("not.a.jwt"),
            Err(DomainError::InvalidToken)
        ));
    }
}
