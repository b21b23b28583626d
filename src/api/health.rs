//! Health check with component-level probes.
//!
//! `/health` probes the LLM and the map service concurrently. The overall
//! status is `healthy`, `degraded` (map service down) or `unhealthy`
//! (LLM down); `unhealthy` is also signalled with 503 for load balancers.

use super::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use wayfarer_core::{HealthReport, HealthStatus};

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

/// Probe every component
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Healthy or degraded"),
        (status = 503, description = "LLM unreachable")
    )
)]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let report = state.assistant.health().await;

    let status = match report.status {
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
    };

    (status, Json(report))
}
