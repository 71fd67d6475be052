//! # Notification Inbox API
//!
//! - `GET  /v1/notifications`           : The caller's notifications, newest first
//! - `POST /v1/notifications/{id}/read` : Mark one as read

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::Caller;
use crate::error::AppError;
use crate::inbox::Notification;
use crate::state::AppState;

/// The caller's inbox.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NotificationListResponse {
    pub notifications: Vec<Notification>,
    pub unread: usize,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/notifications", get(list_notifications))
        .route("/v1/notifications/{id}/read", post(mark_read))
}

/// GET /v1/notifications: The caller's notifications.
#[utoipa::path(
    get,
    path = "/v1/notifications",
    responses(
        (status = 200, description = "Notifications, newest first", body = NotificationListResponse),
    ),
    tag = "notifications"
)]
pub(crate) async fn list_notifications(
    State(state): State<AppState>,
    caller: Caller,
) -> Json<NotificationListResponse> {
    let recipient = caller.id();
    Json(NotificationListResponse {
        notifications: state.inbox.list_for(&recipient),
        unread: state.inbox.unread_count(&recipient),
    })
}

/// POST /v1/notifications/{id}/read: Mark a notification as read.
#[utoipa::path(
    post,
    path = "/v1/notifications/{id}/read",
    params(("id" = Uuid, Path, description = "Notification UUID")),
    responses(
        (status = 200, description = "Notification marked read", body = Notification),
        (status = 404, description = "No such notification for the caller", body = crate::error::ErrorBody),
    ),
    tag = "notifications"
)]
pub(crate) async fn mark_read(
    State(state): State<AppState>,
    caller: Caller,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<Json<Notification>, AppError> {
    Ok(Json(state.inbox.mark_read(id, &caller.id())?))
}
