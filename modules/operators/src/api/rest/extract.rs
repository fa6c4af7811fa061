//! Bearer-token extractors.
//!
//! Both read the `Extension<Arc<AuthService>>` layered onto the router by
//! every module that protects routes. The token comes from
//! `Authorization: Bearer <token>`, falling back to a `token` query parameter
//! for clients (WebSocket upgrades) that cannot set headers.

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use modkit::api::ApiError;

use crate::contract::model::Admin;
use crate::domain::error::DomainError;
use crate::domain::service::AuthService;

/// Any authenticated, active admin.
#[derive(Debug, Clone)]
pub struct CurrentAdmin(pub Admin);

/// An authenticated admin holding the `super_admin` role.
#[derive(Debug, Clone)]
pub struct SuperAdmin(pub Admin);

fn bearer_token(parts: &Parts) -> Option<String> {
    let from_header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = from_header {
        return Some(token.to_string());
    }

    parts.uri.query().and_then(|q| {
        q.split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(k, _)| *k == "token")
            .map(|(_, v)| v.to_string())
            .filter(|v| !v.is_empty())
    })
}

async fn authenticate(parts: &Parts) -> Result<Admin, ApiError> {
    let Some(auth) = parts.extensions.get::<Arc<AuthService>>().cloned() else {
        tracing::error!("AuthService extension missing on a protected route");
        return Err(ApiError::internal(
            "Something went wrong!",
            "authentication is not configured",
        ));
    };
    let token = bearer_token(parts).ok_or(DomainError::MissingToken)?;
    Ok(auth.authenticate(&token).await?)
}

impl<S> FromRequestParts<S> for CurrentAdmin
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        authenticate(parts).await.map(Self)
    }
}

impl<S> FromRequestParts<S> for SuperAdmin
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let admin = authenticate(parts).await?;
        AuthService::require_super_admin(&admin)?;
        Ok(Self(admin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(uri: &str, auth: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri(uri);
        if let Some(value) = auth {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn header_wins_over_query() {
        let p = parts("/api/ws?token=fromquery", Some("Bearer fromheader"));
        assert_eq!(bearer_token(&p).as_deref(), Some("fromheader"));
    }

    #[test]
    fn query_fallback() {
        let p = parts("/api/ws?a=1&token=abc", None);
        assert_eq!(bearer_token(&p).as_deref(), Some("abc"));
    }

    #[test]
    fn missing_or_malformed_header() {
        assert_eq!(bearer_token(&parts("/x", None)), None);
        assert_eq!(bearer_token(&parts("/x", Some("Basic abc"))), None);
        assert_eq!(bearer_token(&parts("/x", Some("Bearer "))), None);
        assert_eq!(bearer_token(&parts("/x?token=", None)), None);
    }
}
