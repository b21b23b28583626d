//! Usage examples

use super::AppState;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use wayfarer_core::UsageExample;

#[derive(Debug, Serialize)]
pub struct ExamplesResponse {
    pub usage_examples: Vec<UsageExample>,
}

pub fn examples_routes() -> Router<AppState> {
    Router::new().route("/examples", get(get_examples))
}

/// One sample request per category
#[utoipa::path(
    get,
    path = "/examples",
    tag = "capabilities",
    responses((status = 200, description = "Usage examples"))
)]
pub async fn get_examples(State(state): State<AppState>) -> Json<ExamplesResponse> {
    Json(ExamplesResponse {
        usage_examples: state.assistant.examples(),
    })
}
