//! # Authentication and Caller Resolution
//!
//! Two independent checks guard `/v1`:
//!
//! 1. [`auth_middleware`]: when a shared token is configured, every request
//!    must carry `Authorization: Bearer <token>`.
//! 2. [`Caller`]: the upstream identity provider forwards the authenticated
//!    principal as `X-Principal-Id`; the extractor resolves it against the
//!    identity directory to obtain the role and display name.

use axum::extract::{FromRequestParts, Request};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, HeaderMapExt};
use subtle::ConstantTimeEq;

use ptw_core::{Identity, PermitError, Principal, PrincipalId};

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the authenticated principal's id.
pub const PRINCIPAL_HEADER: &str = "x-principal-id";

// ── Shared Token ────────────────────────────────────────────────────────────

/// Auth configuration injected into request extensions.
///
/// Custom `Debug` redacts the token value.
#[derive(Clone)]
pub struct AuthConfig {
    pub token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Constant-time token comparison.
fn token_matches(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

/// Reject requests without the configured bearer token. With no token
/// configured every request passes.
pub async fn auth_middleware(request: Request, next: Next) -> Response {
    let expected = request
        .extensions()
        .get::<AuthConfig>()
        .and_then(|config| config.token.clone());

    let Some(expected) = expected else {
        return next.run(request).await;
    };

    match request.headers().typed_get::<Authorization<Bearer>>() {
        Some(authorization) if token_matches(authorization.token(), &expected) => {
            next.run(request).await
        }
        Some(_) => {
            tracing::warn!("authentication failed: invalid bearer token");
            AppError::Unauthorized("invalid bearer token".into()).into_response()
        }
        None => {
            tracing::warn!("authentication failed: missing bearer token");
            AppError::Unauthorized("missing bearer token".into()).into_response()
        }
    }
}

// ── Caller ──────────────────────────────────────────────────────────────────

/// The resolved caller of a `/v1` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller(pub Identity);

impl Caller {
    pub fn principal(&self) -> Principal {
        self.0.principal()
    }

    pub fn id(&self) -> PrincipalId {
        self.0.id
    }
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(PRINCIPAL_HEADER)
            .ok_or_else(|| AppError::Unauthorized(format!("missing {PRINCIPAL_HEADER} header")))?
            .to_str()
            .map_err(|_| AppError::Unauthorized(format!("{PRINCIPAL_HEADER} is not valid text")))?;
        let id = raw
            .parse::<PrincipalId>()
            .map_err(|_| AppError::Unauthorized(format!("{PRINCIPAL_HEADER} is not a UUID")))?;

        match state.engine.identity(&id) {
            Ok(identity) => Ok(Self(identity)),
            Err(PermitError::NotFound { .. }) => {
                tracing::warn!(principal = %id.as_uuid(), "unknown principal");
                Err(AppError::Unauthorized("unknown principal".into()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
