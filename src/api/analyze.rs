//! One-shot analysis endpoint

use super::error::ApiError;
use super::AppState;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::info;
use utoipa::ToSchema;
use wayfarer_core::{AnalysisReport, AnalyzeRequest, CancellationToken, ReportMetadata, Scenario};

/// Analysis request body
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AnalyzeBody {
    /// Free-text travel or location request
    pub query: String,
    /// Free-text preferences
    #[serde(default)]
    pub preferences: Option<String>,
    /// Structured constraints (budget, dates, ...)
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub constraints: Option<BTreeMap<String, Value>>,
}

/// Analysis response body
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub response: String,
    pub analysis_type: String,
    pub scenario: Scenario,
    pub tools_used: Vec<String>,
    pub metadata: ReportMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<AnalysisReport> for AnalyzeResponse {
    fn from(report: AnalysisReport) -> Self {
        let (error, message) = match report.error {
            Some(e) => (Some(e.code), Some(e.message)),
            None => (None, None),
        };

        Self {
            success: report.success,
            response: report.response,
            analysis_type: report.analysis_type,
            scenario: report.scenario,
            tools_used: report.tools_used,
            metadata: report.metadata,
            error,
            message,
        }
    }
}

pub fn analyze_routes() -> Router<AppState> {
    Router::new().route("/analyze", post(analyze))
}

/// Run one classify + orchestrate + report turn
#[utoipa::path(
    post,
    path = "/analyze",
    tag = "analysis",
    request_body = AnalyzeBody,
    responses(
        (status = 200, description = "Report, or success=false with the fallback report"),
        (status = 400, description = "Empty query")
    )
)]
pub async fn analyze(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeBody>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let query = body.query.trim();
    if query.is_empty() {
        return Err(ApiError::bad_request("query must not be empty"));
    }

    info!(query = %query, "Processing analysis request");

    let request = AnalyzeRequest {
        query: query.to_string(),
        preferences: body.preferences,
        constraints: body.constraints,
    };

    // Dropping the handler (client went away) cancels the turn.
    let cancel = CancellationToken::new();
    let _cancel_on_drop = cancel.clone().drop_guard();

    let report = state.assistant.analyze(request, &cancel).await;
    if report.error.as_ref().is_some_and(|e| e.code == "cancelled") {
        return Err(wayfarer_core::Error::Cancelled.into());
    }

    Ok(Json(report.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{state_with, test_state, travel_llm, RENTAL_QUERY, REPORT};
    use axum::http::StatusCode;
    use wayfarer_tools::MockExecutor;

    fn body(query: &str) -> AnalyzeBody {
        AnalyzeBody {
            query: query.to_string(),
            preferences: None,
            constraints: None,
        }
    }

    #[tokio::test]
    async fn test_analyze_rental() {
        let response = analyze(State(test_state()), Json(body(RENTAL_QUERY)))
            .await
            .unwrap();

        assert!(response.0.success);
        assert_eq!(response.0.response, REPORT);
        assert_eq!(response.0.analysis_type, "租房位置分析");
        assert_eq!(response.0.tools_used, vec!["maps_geo".to_string()]);
        assert_eq!(response.0.metadata.tool_calls_count, 1);
        assert!(response.0.error.is_none());
    }

    #[tokio::test]
    async fn test_analyze_empty_query() {
        let err = analyze(State(test_state()), Json(body("   ")))
            .await
            .unwrap_err();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(!err.body.success);
    }

    #[tokio::test]
    async fn test_analyze_synthesis_failure_flattens_error() {
        let state = state_with(travel_llm(false), MockExecutor::new());

        let response = analyze(State(state), Json(body(RENTAL_QUERY)))
            .await
            .unwrap();

        assert!(!response.0.success);
        assert_eq!(response.0.error.as_deref(), Some("synthesis_failed"));
        assert!(response.0.message.is_some());

        let json = serde_json::to_value(&response.0).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "synthesis_failed");
        assert!(json["metadata"]["processing_time"].is_number());
    }
}
