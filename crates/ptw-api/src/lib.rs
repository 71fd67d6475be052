//! # ptw-api: Axum API Service for Permit-to-Work
//!
//! HTTP surface over the lifecycle engine: permit creation and review,
//! stateless risk preview, per-user notification inboxes, and the identity
//! directory.
//!
//! ## API Surface
//!
//! | Prefix                 | Module                       | Domain              |
//! |------------------------|------------------------------|---------------------|
//! | `/v1/permits/*`        | [`routes::permits`]          | Permit lifecycle    |
//! | `/v1/risk/*`           | [`routes::risk`]             | Risk preview        |
//! | `/v1/notifications/*`  | [`routes::notifications`]    | Inbox               |
//! | `/v1/me`, `/v1/identities` | [`routes::identities`]   | Identity directory  |
//! | `/openapi.json`        | [`openapi`]                  | API description     |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → AuthMiddleware → Handler
//! ```
//!
//! `/health/*` and `/metrics` are mounted outside authentication.

pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod db;
pub mod error;
pub mod inbox;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, StatusCode};
use axum::middleware::from_fn;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Router};
use tower_http::trace::TraceLayer;

use ptw_engine::{PermitRepository, PermitStats};

use crate::auth::AuthConfig;
use crate::state::AppState;

/// Request bodies are small JSON documents.
const BODY_LIMIT_BYTES: usize = 256 * 1024;

/// Assemble the full application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        token: state.config.auth_token.clone(),
    };
    let metrics_on = state.metrics.is_some();

    let mut api = Router::new()
        .merge(routes::permits::router())
        .merge(routes::risk::router())
        .merge(routes::notifications::router())
        .merge(routes::identities::router())
        .merge(openapi::router())
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(from_fn(auth::auth_middleware));

    if metrics_on {
        api = api.layer(from_fn(middleware::metrics::metrics_middleware));
    }

    let api = api
        .layer(TraceLayer::new_for_http())
        .layer(Extension(auth_config))
        .with_state(state.clone());

    let mut unauthenticated = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness));

    if metrics_on {
        unauthenticated = unauthenticated.route("/metrics", get(prometheus_metrics));
    }

    Router::new()
        .merge(unauthenticated.with_state(state))
        .merge(api)
}

/// GET /metrics: Prometheus scrape endpoint.
///
/// Refreshes the permit gauges from the store before rendering.
async fn prometheus_metrics(State(state): State<AppState>) -> impl IntoResponse {
    let Some(handle) = &state.metrics else {
        return (StatusCode::NOT_FOUND, "metrics disabled").into_response();
    };

    match state.repository.list_permits() {
        Ok(permits) => {
            let stats = PermitStats::tally(&permits);
            for (status, count) in [
                ("DRAFT", stats.draft),
                ("SUBMITTED", stats.submitted),
                ("APPROVED", stats.approved),
                ("REJECTED", stats.rejected),
            ] {
                metrics::gauge!("ptw_permits", "status" => status).set(count as f64);
            }
        }
        Err(e) => tracing::warn!(error = %e, "permit gauges not refreshed"),
    }
    metrics::gauge!("ptw_notifications_stored").set(state.inbox.len() as f64);

    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    )
        .into_response()
}

/// Liveness probe: always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: 200 "ready", or 503 when the database is unreachable.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    if let Some(pool) = &state.db_pool {
        if let Err(e) = sqlx::query("SELECT 1").execute(pool).await {
            tracing::warn!("Database health check failed: {e}");
            return (StatusCode::SERVICE_UNAVAILABLE, "database unreachable").into_response();
        }
    }

    (StatusCode::OK, "ready").into_response()
}
