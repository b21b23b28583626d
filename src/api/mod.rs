//! Web API module for Wayfarer
//!
//! Provides REST API endpoints for:
//! - One-shot analysis and multi-turn chat
//! - Capability listing and usage examples
//! - Intent and tool debugging
//! - Component health

pub mod analyze;
pub mod capabilities;
pub mod chat;
pub mod debug;
pub mod docs;
pub mod error;
pub mod examples;
pub mod health;

#[cfg(test)]
pub(crate) mod test_support;

use axum::Router;
use std::sync::Arc;
use wayfarer_core::TravelAssistant;

pub use analyze::analyze_routes;
pub use capabilities::capabilities_routes;
pub use chat::chat_routes;
pub use debug::debug_routes;
pub use examples::examples_routes;
pub use health::health_routes;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub assistant: Arc<TravelAssistant>,
}

impl AppState {
    pub fn new(assistant: Arc<TravelAssistant>) -> Self {
        Self { assistant }
    }
}

/// Create the API router with all endpoints
pub fn api_router(assistant: Arc<TravelAssistant>) -> Router {
    Router::new()
        .merge(analyze_routes())
        .merge(chat_routes())
        .merge(capabilities_routes())
        .merge(examples_routes())
        .merge(debug_routes())
        .merge(health_routes())
        .with_state(AppState::new(assistant))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_router_chat_unknown_session() {
        let router = api_router(test_support::test_state().assistant);

        let (status, body) = send(
            router,
            post_json(
                "/chat",
                json!({"message": "你好", "conversation_id": uuid::Uuid::new_v4().to_string()}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "session_not_found");
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn test_router_analyze() {
        let router = api_router(test_support::test_state().assistant);

        let (status, body) = send(
            router,
            post_json("/analyze", json!({"query": test_support::RENTAL_QUERY})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["analysis_type"], "租房位置分析");
        assert_eq!(body["tools_used"], json!(["maps_geo"]));
        assert_eq!(body["metadata"]["tool_calls_count"], 1);
    }

    #[tokio::test]
    async fn test_router_empty_query_is_400() {
        let router = api_router(test_support::test_state().assistant);

        let (status, body) = send(router, post_json("/analyze", json!({"query": ""}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_router_health() {
        let router = api_router(test_support::test_state().assistant);

        let (status, body) = send(
            router,
            Request::get("/health").body(Body::empty()).unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert!(body["components"]["llm"].is_object());
        assert!(body["components"]["mcp"].is_object());
        assert!(body["timestamp"].is_string());
    }
}
