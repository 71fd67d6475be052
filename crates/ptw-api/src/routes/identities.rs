//! # Identity Directory API
//!
//! - `GET  /v1/me`         : The caller's identity and capabilities
//! - `GET  /v1/identities` : Directory listing (manage-users)
//! - `POST /v1/identities` : Register a person (manage-users)

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use ptw_core::{Identity, PermitError, PrincipalId, Role};
use ptw_policy::Action;

use crate::auth::Caller;
use crate::error::AppError;
use crate::state::AppState;

/// Request to register a person in the directory.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateIdentityRequest {
    /// Issued by the identity provider; generated when omitted.
    pub id: Option<Uuid>,
    pub display_name: String,
    /// EMPLOYEE, SUPERVISOR, SAFETY_OFFICER, SECURITY or ADMIN.
    pub role: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IdentityResponse {
    pub id: Uuid,
    pub display_name: String,
    pub role: String,
}

impl From<&Identity> for IdentityResponse {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id.0,
            display_name: identity.display_name.clone(),
            role: identity.role.as_str().to_string(),
        }
    }
}

/// One capability grant.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GrantResponse {
    pub action: String,
    /// `own` or `any`.
    pub scope: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MeResponse {
    pub identity: IdentityResponse,
    pub grants: Vec<GrantResponse>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/me", get(me))
        .route("/v1/identities", get(list_identities).post(create_identity))
}

/// GET /v1/me: The caller's identity and capability grants.
#[utoipa::path(
    get,
    path = "/v1/me",
    responses((status = 200, description = "Caller identity", body = MeResponse)),
    tag = "identities"
)]
pub(crate) async fn me(State(state): State<AppState>, caller: Caller) -> Json<MeResponse> {
    let grants = state
        .engine
        .policy()
        .table()
        .grants(caller.0.role)
        .map(|(action, scope)| GrantResponse {
            action: action.as_str().to_string(),
            scope: scope.as_str().to_string(),
        })
        .collect();
    Json(MeResponse {
        identity: IdentityResponse::from(&caller.0),
        grants,
    })
}

/// GET /v1/identities: Directory listing.
#[utoipa::path(
    get,
    path = "/v1/identities",
    responses(
        (status = 200, description = "All registered identities", body = Vec<IdentityResponse>),
        (status = 403, description = "Caller may not manage users", body = crate::error::ErrorBody),
    ),
    tag = "identities"
)]
pub(crate) async fn list_identities(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<IdentityResponse>>, AppError> {
    state
        .engine
        .policy()
        .check(&caller.principal(), Action::ManageUsers, None)?;
    let mut identities = state.repository.identities();
    identities.sort_by(|a, b| a.display_name.cmp(&b.display_name).then(a.id.cmp(&b.id)));
    Ok(Json(identities.iter().map(IdentityResponse::from).collect()))
}

/// POST /v1/identities: Register or replace a directory entry.
#[utoipa::path(
    post,
    path = "/v1/identities",
    request_body = CreateIdentityRequest,
    responses(
        (status = 201, description = "Identity registered", body = IdentityResponse),
        (status = 403, description = "Caller may not manage users", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid name or role", body = crate::error::ErrorBody),
    ),
    tag = "identities"
)]
pub(crate) async fn create_identity(
    State(state): State<AppState>,
    caller: Caller,
    WithRejection(Json(req), _): WithRejection<Json<CreateIdentityRequest>, AppError>,
) -> Result<(StatusCode, Json<IdentityResponse>), AppError> {
    state
        .engine
        .policy()
        .check(&caller.principal(), Action::ManageUsers, None)?;

    let display_name = req.display_name.trim();
    if display_name.is_empty() {
        return Err(PermitError::validation("display_name", "display name is required").into());
    }
    let role: Role = req.role.parse()?;
    let id = req.id.map(PrincipalId).unwrap_or_default();
    let identity = Identity::new(id, display_name, role);

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::identities::upsert(pool, &identity).await {
            tracing::error!(principal = %identity.id, error = %e, "failed to persist identity to database");
            return Err(AppError::Internal("identity database persist failed".to_string()));
        }
    }
    state.repository.register_identity(identity.clone());
    tracing::info!(principal = %identity.id, role = %identity.role, by = %caller.id(), "identity registered");

    Ok((StatusCode::CREATED, Json(IdentityResponse::from(&identity))))
}
