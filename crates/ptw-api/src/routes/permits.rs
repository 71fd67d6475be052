//! # Permit Lifecycle API
//!
//! ## Endpoints
//!
//! - `POST   /v1/permits`                 : Create a DRAFT permit
//! - `GET    /v1/permits`                 : List visible permits
//! - `GET    /v1/permits/stats`           : Counts by status and risk
//! - `GET    /v1/permits/number/{number}` : Look up by permit number
//! - `GET    /v1/permits/{id}`            : Permit details
//! - `PATCH  /v1/permits/{id}`            : Edit safety fields of a DRAFT
//! - `POST   /v1/permits/{id}/submit`     : DRAFT → SUBMITTED
//! - `POST   /v1/permits/{id}/approve`    : SUBMITTED → APPROVED
//! - `POST   /v1/permits/{id}/reject`     : SUBMITTED → REJECTED
//! - `GET    /v1/permits/{id}/history`    : Audit narrative
//!
//! Handlers delegate to the lifecycle engine. Mutations run on the blocking
//! pool, since the repository may journal each commit to Postgres while it
//! holds its lock.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::WithRejection;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use ptw_core::{PermitError, PermitId, PermitNumber, PermitType, PrincipalId, RiskLevel, Timestamp};
use ptw_engine::{
    DraftPatch, PageRequest, PermitEngine, PermitFilter, PermitStats, DEFAULT_PAGE_SIZE,
};
use ptw_state::{HistoryEntry, Permit, PermitRequest, PermitStatus};

use crate::auth::Caller;
use crate::error::AppError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

/// Request to create a permit.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreatePermitRequest {
    /// One of HOT_WORK, CONFINED_SPACE, HEIGHT_WORK, ELECTRICAL_WORK,
    /// CHEMICAL_WORK, GENERAL_WORK.
    pub permit_type: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub work_location: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    /// Must be after `start_date`.
    pub end_date: Option<DateTime<Utc>>,
    pub safety_measures: Option<String>,
    pub required_ppe: Option<String>,
}

impl From<CreatePermitRequest> for PermitRequest {
    fn from(req: CreatePermitRequest) -> Self {
        PermitRequest {
            permit_type: req.permit_type,
            title: req.title,
            description: req.description,
            work_location: req.work_location,
            start_date: req.start_date.map(Timestamp::from_utc),
            end_date: req.end_date.map(Timestamp::from_utc),
            safety_measures: req.safety_measures,
            required_ppe: req.required_ppe,
        }
    }
}

/// Edit to a DRAFT permit's safety fields. Omitted fields are unchanged;
/// an empty string clears a field.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateDraftRequest {
    pub safety_measures: Option<String>,
    pub required_ppe: Option<String>,
}

/// Request to reject a submitted permit.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct RejectRequest {
    /// Required, non-blank.
    #[serde(default)]
    pub reason: Option<String>,
}

/// A permit as returned by the API.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PermitResponse {
    pub id: Uuid,
    pub permit_number: String,
    pub permit_type: String,
    pub title: String,
    pub description: String,
    pub work_location: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub risk_level: String,
    pub risk_report: String,
    pub safety_measures: Option<String>,
    pub required_ppe: Option<String>,
    pub status: String,
    pub applicant_id: Uuid,
    pub submitted_at: Option<DateTime<Utc>>,
    pub approver_id: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejector_id: Option<Uuid>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Write counter; increases by one on every committed change.
    pub revision: u64,
}

impl From<&Permit> for PermitResponse {
    fn from(p: &Permit) -> Self {
        Self {
            id: *p.id.as_uuid(),
            permit_number: p.permit_number.to_string(),
            permit_type: p.permit_type.as_str().to_string(),
            title: p.title.clone(),
            description: p.description.clone(),
            work_location: p.work_location.clone(),
            start_date: *p.start_date.as_datetime(),
            end_date: *p.end_date.as_datetime(),
            risk_level: p.risk_level.as_str().to_string(),
            risk_report: p.risk_report.clone(),
            safety_measures: p.safety_measures.clone(),
            required_ppe: p.required_ppe.clone(),
            status: p.status().as_str().to_string(),
            applicant_id: *p.applicant_id.as_uuid(),
            submitted_at: p.submitted_at().map(|t| *t.as_datetime()),
            approver_id: p.approver_id().map(|id| id.0),
            approved_at: p.approved_at().map(|t| *t.as_datetime()),
            rejector_id: p.rejector_id().map(|id| id.0),
            rejected_at: p.rejected_at().map(|t| *t.as_datetime()),
            rejection_reason: p.rejection_reason().map(str::to_string),
            created_at: *p.created_at.as_datetime(),
            updated_at: *p.updated_at.as_datetime(),
            revision: p.revision,
        }
    }
}

/// List query parameters.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// DRAFT, SUBMITTED, APPROVED or REJECTED.
    pub status: Option<String>,
    /// LOW, MEDIUM or HIGH.
    pub risk_level: Option<String>,
    pub permit_type: Option<String>,
    pub applicant_id: Option<Uuid>,
    /// Case-insensitive text search over title, description and location.
    pub q: Option<String>,
    /// Zero-based page index.
    pub page: Option<usize>,
    /// Page size, clamped to 1..=100.
    pub size: Option<usize>,
}

impl ListQuery {
    fn into_filter(self) -> Result<(PermitFilter, PageRequest), AppError> {
        let filter = PermitFilter {
            status: self.status.as_deref().map(str::parse::<PermitStatus>).transpose()?,
            risk_level: self.risk_level.as_deref().map(str::parse::<RiskLevel>).transpose()?,
            permit_type: self.permit_type.as_deref().map(str::parse::<PermitType>).transpose()?,
            applicant_id: self.applicant_id.map(PrincipalId),
            query: self.q,
        };
        let page = PageRequest::new(
            self.page.unwrap_or(0),
            self.size.unwrap_or(DEFAULT_PAGE_SIZE),
        );
        Ok((filter, page))
    }
}

/// One page of permits.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PermitListResponse {
    pub permits: Vec<PermitResponse>,
    pub page: usize,
    pub size: usize,
    /// Matches across all pages.
    pub total: usize,
}

/// Counts over the permits visible to the caller.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PermitStatsResponse {
    pub total: usize,
    pub draft: usize,
    pub submitted: usize,
    pub approved: usize,
    pub rejected: usize,
    pub low_risk: usize,
    pub medium_risk: usize,
    pub high_risk: usize,
}

impl From<PermitStats> for PermitStatsResponse {
    fn from(s: PermitStats) -> Self {
        Self {
            total: s.total,
            draft: s.draft,
            submitted: s.submitted,
            approved: s.approved,
            rejected: s.rejected,
            low_risk: s.low_risk,
            medium_risk: s.medium_risk,
            high_risk: s.high_risk,
        }
    }
}

/// One history line.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HistoryEntryResponse {
    /// CREATED, CURRENT_STATUS, SUBMITTED, APPROVED, REJECTED or REJECTION_REASON.
    pub kind: String,
    pub at: DateTime<Utc>,
    pub actor: Option<Uuid>,
    pub message: String,
}

impl From<&HistoryEntry> for HistoryEntryResponse {
    fn from(e: &HistoryEntry) -> Self {
        let kind = serde_json::to_value(e.kind)
            .ok()
            .and_then(|v| v.as_str().map(String::from))
            .unwrap_or_else(|| format!("{:?}", e.kind));
        Self {
            kind,
            at: *e.at.as_datetime(),
            actor: e.actor.map(|id| id.0),
            message: e.message.clone(),
        }
    }
}

/// A permit's audit narrative.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HistoryResponse {
    pub permit_id: Uuid,
    pub entries: Vec<HistoryEntryResponse>,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the permit router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/permits", post(create_permit).get(list_permits))
        .route("/v1/permits/stats", get(permit_stats))
        .route("/v1/permits/number/{number}", get(get_permit_by_number))
        .route("/v1/permits/{id}", get(get_permit).patch(update_draft))
        .route("/v1/permits/{id}/submit", post(submit_permit))
        .route("/v1/permits/{id}/approve", post(approve_permit))
        .route("/v1/permits/{id}/reject", post(reject_permit))
        .route("/v1/permits/{id}/history", get(permit_history))
}

// ---------------------------------------------------------------------------
// Engine calls
// ---------------------------------------------------------------------------

/// Run a mutating engine call on the blocking pool.
async fn run_engine<T, F>(state: &AppState, op: F) -> Result<T, AppError>
where
    F: FnOnce(&PermitEngine) -> Result<T, PermitError> + Send + 'static,
    T: Send + 'static,
{
    let engine = state.engine.clone();
    tokio::task::spawn_blocking(move || op(&engine))
        .await
        .map_err(|e| AppError::Internal(format!("engine task failed: {e}")))?
        .map_err(AppError::from)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /v1/permits: Create a DRAFT permit.
#[utoipa::path(
    post,
    path = "/v1/permits",
    request_body = CreatePermitRequest,
    responses(
        (status = 201, description = "Permit created", body = PermitResponse),
        (status = 403, description = "Role may not create permits", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid permit attributes", body = crate::error::ErrorBody),
    ),
    tag = "permits"
)]
pub(crate) async fn create_permit(
    State(state): State<AppState>,
    caller: Caller,
    WithRejection(Json(req), _): WithRejection<Json<CreatePermitRequest>, AppError>,
) -> Result<(StatusCode, Json<PermitResponse>), AppError> {
    let applicant = caller.principal();
    let request = PermitRequest::from(req);
    let permit = run_engine(&state, move |engine| engine.create(&applicant, request)).await?;
    Ok((StatusCode::CREATED, Json(PermitResponse::from(&permit))))
}

/// GET /v1/permits: List permits visible to the caller, newest first.
#[utoipa::path(
    get,
    path = "/v1/permits",
    params(ListQuery),
    responses(
        (status = 200, description = "One page of permits", body = PermitListResponse),
        (status = 422, description = "Invalid filter", body = crate::error::ErrorBody),
    ),
    tag = "permits"
)]
pub(crate) async fn list_permits(
    State(state): State<AppState>,
    caller: Caller,
    WithRejection(Query(query), _): WithRejection<Query<ListQuery>, AppError>,
) -> Result<Json<PermitListResponse>, AppError> {
    let (filter, page) = query.into_filter()?;
    let result = state.engine.list(&caller.principal(), &filter, page)?;
    Ok(Json(PermitListResponse {
        permits: result.items.iter().map(PermitResponse::from).collect(),
        page: result.page,
        size: result.size,
        total: result.total,
    }))
}

/// GET /v1/permits/stats: Counts by status and risk level.
#[utoipa::path(
    get,
    path = "/v1/permits/stats",
    responses(
        (status = 200, description = "Permit counts", body = PermitStatsResponse),
    ),
    tag = "permits"
)]
pub(crate) async fn permit_stats(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<PermitStatsResponse>, AppError> {
    let stats = state.engine.stats(&caller.principal())?;
    Ok(Json(stats.into()))
}

/// GET /v1/permits/{id}: Permit details.
#[utoipa::path(
    get,
    path = "/v1/permits/{id}",
    params(("id" = Uuid, Path, description = "Permit UUID")),
    responses(
        (status = 200, description = "Permit details", body = PermitResponse),
        (status = 403, description = "Not visible to the caller", body = crate::error::ErrorBody),
        (status = 404, description = "Permit not found", body = crate::error::ErrorBody),
    ),
    tag = "permits"
)]
pub(crate) async fn get_permit(
    State(state): State<AppState>,
    caller: Caller,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<Json<PermitResponse>, AppError> {
    let permit = state.engine.get(&PermitId(id), &caller.principal())?;
    Ok(Json(PermitResponse::from(&permit)))
}

/// GET /v1/permits/number/{number}: Look up a permit by number.
#[utoipa::path(
    get,
    path = "/v1/permits/number/{number}",
    params(("number" = String, Path, description = "Permit number, e.g. PTW-20261019-000001")),
    responses(
        (status = 200, description = "Permit details", body = PermitResponse),
        (status = 404, description = "Permit not found", body = crate::error::ErrorBody),
    ),
    tag = "permits"
)]
pub(crate) async fn get_permit_by_number(
    State(state): State<AppState>,
    caller: Caller,
    WithRejection(Path(number), _): WithRejection<Path<String>, AppError>,
) -> Result<Json<PermitResponse>, AppError> {
    let number = PermitNumber::parse(&number)?;
    let permit = state.engine.get_by_number(&number, &caller.principal())?;
    Ok(Json(PermitResponse::from(&permit)))
}

/// PATCH /v1/permits/{id}: Edit safety measures and PPE of a DRAFT.
#[utoipa::path(
    patch,
    path = "/v1/permits/{id}",
    params(("id" = Uuid, Path, description = "Permit UUID")),
    request_body = UpdateDraftRequest,
    responses(
        (status = 200, description = "Draft updated", body = PermitResponse),
        (status = 403, description = "Not the applicant", body = crate::error::ErrorBody),
        (status = 404, description = "Permit not found", body = crate::error::ErrorBody),
        (status = 409, description = "Permit is no longer a draft", body = crate::error::ErrorBody),
    ),
    tag = "permits"
)]
pub(crate) async fn update_draft(
    State(state): State<AppState>,
    caller: Caller,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
    WithRejection(Json(req), _): WithRejection<Json<UpdateDraftRequest>, AppError>,
) -> Result<Json<PermitResponse>, AppError> {
    let patch = DraftPatch {
        safety_measures: req.safety_measures,
        required_ppe: req.required_ppe,
    };
    let principal = caller.principal();
    let permit = run_engine(&state, move |engine| {
        engine.update_draft(&PermitId(id), &principal, patch)
    })
    .await?;
    Ok(Json(PermitResponse::from(&permit)))
}

/// POST /v1/permits/{id}/submit: DRAFT → SUBMITTED.
#[utoipa::path(
    post,
    path = "/v1/permits/{id}/submit",
    params(("id" = Uuid, Path, description = "Permit UUID")),
    responses(
        (status = 200, description = "Permit submitted", body = PermitResponse),
        (status = 403, description = "Not the applicant or an admin", body = crate::error::ErrorBody),
        (status = 404, description = "Permit not found", body = crate::error::ErrorBody),
        (status = 409, description = "Invalid state transition or concurrent change", body = crate::error::ErrorBody),
    ),
    tag = "permits"
)]
pub(crate) async fn submit_permit(
    State(state): State<AppState>,
    caller: Caller,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<Json<PermitResponse>, AppError> {
    let principal = caller.principal();
    let permit = run_engine(&state, move |engine| engine.submit(&PermitId(id), &principal)).await?;
    Ok(Json(PermitResponse::from(&permit)))
}

/// POST /v1/permits/{id}/approve: SUBMITTED → APPROVED.
#[utoipa::path(
    post,
    path = "/v1/permits/{id}/approve",
    params(("id" = Uuid, Path, description = "Permit UUID")),
    responses(
        (status = 200, description = "Permit approved", body = PermitResponse),
        (status = 403, description = "Caller may not approve this permit", body = crate::error::ErrorBody),
        (status = 404, description = "Permit not found", body = crate::error::ErrorBody),
        (status = 409, description = "Invalid state transition or concurrent change", body = crate::error::ErrorBody),
    ),
    tag = "permits"
)]
pub(crate) async fn approve_permit(
    State(state): State<AppState>,
    caller: Caller,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<Json<PermitResponse>, AppError> {
    let principal = caller.principal();
    let permit = run_engine(&state, move |engine| engine.approve(&PermitId(id), &principal)).await?;
    Ok(Json(PermitResponse::from(&permit)))
}

/// POST /v1/permits/{id}/reject: SUBMITTED → REJECTED.
#[utoipa::path(
    post,
    path = "/v1/permits/{id}/reject",
    params(("id" = Uuid, Path, description = "Permit UUID")),
    request_body = RejectRequest,
    responses(
        (status = 200, description = "Permit rejected", body = PermitResponse),
        (status = 403, description = "Caller may not reject this permit", body = crate::error::ErrorBody),
        (status = 404, description = "Permit not found", body = crate::error::ErrorBody),
        (status = 409, description = "Invalid state transition or concurrent change", body = crate::error::ErrorBody),
        (status = 422, description = "Blank rejection reason", body = crate::error::ErrorBody),
    ),
    tag = "permits"
)]
pub(crate) async fn reject_permit(
    State(state): State<AppState>,
    caller: Caller,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
    WithRejection(Json(req), _): WithRejection<Json<RejectRequest>, AppError>,
) -> Result<Json<PermitResponse>, AppError> {
    let reason = req.reason.unwrap_or_default();
    let principal = caller.principal();
    let permit = run_engine(&state, move |engine| {
        engine.reject(&PermitId(id), &principal, &reason)
    })
    .await?;
    Ok(Json(PermitResponse::from(&permit)))
}

/// GET /v1/permits/{id}/history: Audit narrative.
#[utoipa::path(
    get,
    path = "/v1/permits/{id}/history",
    params(("id" = Uuid, Path, description = "Permit UUID")),
    responses(
        (status = 200, description = "Permit history", body = HistoryResponse),
        (status = 404, description = "Permit not found", body = crate::error::ErrorBody),
    ),
    tag = "permits"
)]
pub(crate) async fn permit_history(
    State(state): State<AppState>,
    caller: Caller,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<Json<HistoryResponse>, AppError> {
    let entries = state.engine.history(&PermitId(id), &caller.principal())?;
    Ok(Json(HistoryResponse {
        permit_id: id,
        entries: entries.iter().map(HistoryEntryResponse::from).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_parses_filters() {
        let query = ListQuery {
            status: Some("submitted".into()),
            risk_level: Some("HIGH".into()),
            permit_type: Some("hot_work".into()),
            size: Some(500),
            ..ListQuery::default()
        };
        let (filter, page) = query.into_filter().unwrap();
        assert_eq!(filter.status, Some(PermitStatus::Submitted));
        assert_eq!(filter.risk_level, Some(RiskLevel::High));
        assert_eq!(filter.permit_type, Some(PermitType::HotWork));
        assert_eq!(page.size, 100);
    }

    #[test]
    fn test_list_query_rejects_unknown_status() {
        let query = ListQuery {
            status: Some("CLOSED".into()),
            ..ListQuery::default()
        };
        assert!(query.into_filter().is_err());
    }
}
