//! # Risk Preview API
//!
//! `POST /v1/risk/assess` runs the classifier over draft attributes so a
//! form can show the level before a permit is created. Nothing is stored.

use axum::routing::post;
use axum::{Json, Router};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use ptw_risk::{classify, RiskInput};

use crate::auth::Caller;
use crate::error::AppError;
use crate::state::AppState;

/// Attributes to classify. All fields are optional.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RiskAssessRequest {
    pub permit_type: Option<String>,
    pub work_location: Option<String>,
    pub description: Option<String>,
}

/// Level reached after each stage of the cascade.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RiskStagesResponse {
    pub base: String,
    pub location: String,
    pub description: String,
}

/// Classifier output.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RiskAssessResponse {
    /// LOW, MEDIUM or HIGH.
    pub risk_level: String,
    pub report: String,
    pub stages: RiskStagesResponse,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/v1/risk/assess", post(assess_risk))
}

/// POST /v1/risk/assess: Classify permit attributes without storing them.
#[utoipa::path(
    post,
    path = "/v1/risk/assess",
    request_body = RiskAssessRequest,
    responses(
        (status = 200, description = "Risk level and report", body = RiskAssessResponse),
    ),
    tag = "risk"
)]
pub(crate) async fn assess_risk(
    _caller: Caller,
    WithRejection(Json(req), _): WithRejection<Json<RiskAssessRequest>, AppError>,
) -> Json<RiskAssessResponse> {
    let assessment = classify(&RiskInput {
        permit_type: req.permit_type.as_deref(),
        work_location: req.work_location.as_deref(),
        description: req.description.as_deref(),
    });
    Json(RiskAssessResponse {
        risk_level: assessment.level.as_str().to_string(),
        report: assessment.report,
        stages: RiskStagesResponse {
            base: assessment.stages.base.as_str().to_string(),
            location: assessment.stages.location.as_str().to_string(),
            description: assessment.stages.description.as_str().to_string(),
        },
    })
}
