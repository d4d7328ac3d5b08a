//! `CurrentUser` extractor: resolves the optional bearer token into a principal.

use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crudhub_auth::{Principal, TokenVerifier, resolve_token};
use crudhub_service::RequestContext;

use crate::error::ApiError;

/// The caller of the current request, `None` when anonymous.
///
/// A missing or non-bearer `Authorization` header yields an anonymous
/// caller; a bearer token that fails verification rejects with 401.
#[derive(Debug, Clone, Default)]
pub struct CurrentUser(pub Option<Principal>);

impl CurrentUser {
    /// Request context whose auditor is the caller's name, or `unknown`.
    pub fn context(&self) -> RequestContext {
        RequestContext::new(Principal::auditor_of(self.0.as_ref()))
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    Arc<dyn TokenVerifier>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        let Some(token) = resolve_token(header) else {
            return Ok(Self(None));
        };

        let verifier = Arc::<dyn TokenVerifier>::from_ref(state);
        let claims = verifier.verify(token).await?;
        Ok(Self(Some(Principal::from(claims))))
    }
}
