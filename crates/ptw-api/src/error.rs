//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Domain errors from the lifecycle engine keep their structured fields and
//! surface them in `details`; infrastructure failures are logged and
//! rendered without their message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use utoipa::ToSchema;

use ptw_core::PermitError;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "INVALID_TRANSITION").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Structured context, present only for client errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Lifecycle engine failure; status follows the domain error kind.
    #[error(transparent)]
    Permit(#[from] PermitError),

    /// Request body or parameters could not be interpreted (422).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing or invalid credentials (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Internal server error (500). Message is logged but not returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status and machine-readable code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Permit(err) => {
                let status = match err {
                    PermitError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                    PermitError::NotFound { .. } => StatusCode::NOT_FOUND,
                    PermitError::Forbidden { .. } => StatusCode::FORBIDDEN,
                    PermitError::InvalidTransition { .. } | PermitError::Conflict { .. } => {
                        StatusCode::CONFLICT
                    }
                    PermitError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, err.code())
            }
            Self::BadRequest(_) => (StatusCode::UNPROCESSABLE_ENTITY, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        let Self::Permit(err) = self else {
            return None;
        };
        match err {
            PermitError::Validation { field, .. } => Some(json!({ "field": field })),
            PermitError::NotFound { resource, id } => {
                Some(json!({ "resource": resource.as_str(), "id": id }))
            }
            PermitError::Forbidden { action, role, .. } => {
                Some(json!({ "action": action, "role": role.as_str() }))
            }
            PermitError::InvalidTransition { from, to } => {
                Some(json!({ "current_status": from, "requested_status": to }))
            }
            PermitError::Conflict {
                read_revision,
                stored_revision,
                stored_status,
                ..
            } => Some(json!({
                "read_revision": read_revision,
                "stored_revision": stored_revision,
                "current_status": stored_status,
            })),
            PermitError::Storage(_) => None,
        }
    }

    fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_) | Self::Permit(PermitError::Storage(_)))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = if self.is_internal() {
            tracing::error!(error = %self, "internal server error");
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details: self.details(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<axum::extract::rejection::QueryRejection> for AppError {
    fn from(rejection: axum::extract::rejection::QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<axum::extract::rejection::PathRejection> for AppError {
    fn from(rejection: axum::extract::rejection::PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use ptw_core::{PermitId, ResourceKind, Role, StorageError};

    async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_domain_status_codes() {
        let cases = [
            (PermitError::validation("title", "is required"), StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            (PermitError::not_found(ResourceKind::Permit, PermitId::new()), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (PermitError::forbidden("approve-permit", Role::Employee, "no"), StatusCode::FORBIDDEN, "FORBIDDEN"),
            (
                PermitError::InvalidTransition { from: "DRAFT".into(), to: "APPROVED".into() },
                StatusCode::CONFLICT,
                "INVALID_TRANSITION",
            ),
            (
                PermitError::Storage(StorageError::Backend("disk".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORAGE_ERROR",
            ),
        ];
        for (err, status, code) in cases {
            assert_eq!(AppError::from(err).status_and_code(), (status, code));
        }
    }

    #[test]
    fn test_transport_status_codes() {
        assert_eq!(
            AppError::Unauthorized("x".into()).status_and_code().0,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::BadRequest("x".into()).status_and_code().0,
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[tokio::test]
    async fn test_validation_body_names_field() {
        let (status, body) = render(PermitError::validation("end_date", "must be after start_date").into()).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["details"]["field"], "end_date");
    }

    #[tokio::test]
    async fn test_conflict_body_reports_current_status() {
        let err = PermitError::Conflict {
            permit_id: PermitId::new(),
            read_revision: 1,
            stored_revision: 2,
            stored_status: "APPROVED".into(),
        };
        let (status, body) = render(err.into()).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["details"]["current_status"], "APPROVED");
    }

    #[tokio::test]
    async fn test_storage_message_hidden() {
        let err = PermitError::Storage(StorageError::Backend("password=hunter2".into()));
        let (status, body) = render(err.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["message"], "An internal error occurred");
        assert!(body["error"].get("details").is_none());
    }
}
