//! # OpenAPI Specification Assembly
//!
//! Collects every utoipa-documented route into one OpenAPI document,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::state::AppState;

/// Adds the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .description(Some(
                            "Shared bearer token. Set via PTW_AUTH_TOKEN. The caller is \
                             identified by the X-Principal-Id header.",
                        ))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Permit-to-Work API",
        description = "Risk-classified work permits with a DRAFT → SUBMITTED → APPROVED | REJECTED lifecycle.\n\nAll `/v1/*` endpoints require `Authorization: Bearer <token>` when a token is configured, and an `X-Principal-Id` header naming a registered identity. Health probes and `/metrics` are unauthenticated."
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server"),
    ),
    security(
        ("bearer_auth" = [])
    ),
    paths(
        // ── Permits ─────────────────────────────────────────────────────
        crate::routes::permits::create_permit,
        crate::routes::permits::list_permits,
        crate::routes::permits::permit_stats,
        crate::routes::permits::get_permit,
        crate::routes::permits::get_permit_by_number,
        crate::routes::permits::update_draft,
        crate::routes::permits::submit_permit,
        crate::routes::permits::approve_permit,
        crate::routes::permits::reject_permit,
        crate::routes::permits::permit_history,
        // ── Risk ────────────────────────────────────────────────────────
        crate::routes::risk::assess_risk,
        // ── Notifications ───────────────────────────────────────────────
        crate::routes::notifications::list_notifications,
        crate::routes::notifications::mark_read,
        // ── Identities ──────────────────────────────────────────────────
        crate::routes::identities::me,
        crate::routes::identities::list_identities,
        crate::routes::identities::create_identity,
    ),
    components(
        schemas(
            crate::error::ErrorBody,
            crate::error::ErrorDetail,
            crate::routes::permits::CreatePermitRequest,
            crate::routes::permits::UpdateDraftRequest,
            crate::routes::permits::RejectRequest,
            crate::routes::permits::PermitResponse,
            crate::routes::permits::PermitListResponse,
            crate::routes::permits::PermitStatsResponse,
            crate::routes::permits::HistoryEntryResponse,
            crate::routes::permits::HistoryResponse,
            crate::routes::risk::RiskAssessRequest,
            crate::routes::risk::RiskAssessResponse,
            crate::routes::risk::RiskStagesResponse,
            crate::inbox::Notification,
            crate::routes::notifications::NotificationListResponse,
            crate::routes::identities::CreateIdentityRequest,
            crate::routes::identities::IdentityResponse,
            crate::routes::identities::GrantResponse,
            crate::routes::identities::MeResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "permits", description = "Permit creation, review, and history"),
        (name = "risk", description = "Stateless risk classification"),
        (name = "notifications", description = "Per-user lifecycle notifications"),
        (name = "identities", description = "Identity directory and capabilities"),
    )
)]
pub struct ApiDoc;

pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json: The generated OpenAPI document.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
