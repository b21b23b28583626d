//! Capability listing

use super::AppState;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use wayfarer_core::Capabilities;

pub fn capabilities_routes() -> Router<AppState> {
    Router::new().route("/capabilities", get(get_capabilities))
}

/// Supported scenarios, tool specs and example queries
#[utoipa::path(
    get,
    path = "/capabilities",
    tag = "capabilities",
    responses((status = 200, description = "Service capabilities"))
)]
pub async fn get_capabilities(State(state): State<AppState>) -> Json<Capabilities> {
    Json(state.assistant.capabilities())
}
