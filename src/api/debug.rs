//! Debug endpoints: intent inspection and tool listing

use super::AppState;
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tracing::warn;
use wayfarer_core::Intent;
use wayfarer_tools::{McpTool, ToolSpec};

/// Classifier output for a query
#[derive(Debug, Serialize)]
pub struct QueryAnalysis {
    pub query: String,
    pub intent_analysis: Intent,
    pub suggested_tools: Vec<String>,
    pub analysis_plan: Vec<String>,
    pub confidence: f32,
}

/// Local specs plus whatever the remote endpoint advertises
#[derive(Debug, Serialize)]
pub struct ToolsDebug {
    pub local_tools: Vec<ToolSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_tools: Option<Vec<McpTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_error: Option<String>,
}

pub fn debug_routes() -> Router<AppState> {
    Router::new()
        .route("/debug/analyze-query/:query", get(debug_analyze_query))
        .route("/debug/tools", get(debug_tools))
}

/// Classify a query without running tools
#[utoipa::path(
    get,
    path = "/debug/analyze-query/{query}",
    tag = "debug",
    params(("query" = String, Path, description = "Free-text request")),
    responses((status = 200, description = "Classified intent"))
)]
pub async fn debug_analyze_query(
    State(state): State<AppState>,
    Path(query): Path<String>,
) -> Json<QueryAnalysis> {
    let intent = state.assistant.classify(&query).await;

    Json(QueryAnalysis {
        query,
        suggested_tools: intent.recommended_tool_hints.clone(),
        analysis_plan: intent.analysis_plan.clone(),
        confidence: intent.confidence,
        intent_analysis: intent,
    })
}

/// List local tool specs and the remote tool listing
#[utoipa::path(
    get,
    path = "/debug/tools",
    tag = "debug",
    responses((status = 200, description = "Local and remote tools"))
)]
pub async fn debug_tools(State(state): State<AppState>) -> Json<ToolsDebug> {
    let local_tools = state.assistant.tools().list_tools().to_vec();

    let (remote_tools, remote_error) = match state.assistant.remote_tools().await {
        Ok(tools) => (Some(tools), None),
        Err(e) => {
            warn!(error = %e, "Remote tool listing failed");
            (None, Some(e.to_string()))
        }
    };

    Json(ToolsDebug {
        local_tools,
        remote_tools,
        remote_error,
    })
}
