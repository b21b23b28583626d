//! API Documentation - Swagger UI
//!
//! Provides OpenAPI documentation at /docs

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::{analyze::AnalyzeBody, chat::ChatBody};

/// Wayfarer API OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Wayfarer API",
        description = "LLM-driven travel and location assistant.

## Overview
- **Analysis**: one-shot reports for rental, travel, route, POI and accommodation requests
- **Chat**: multi-turn conversations keyed by `conversation_id`
- **Debug**: intent inspection and tool listings
- **Health**: LLM and map service probes
"
    ),
    servers((url = "/", description = "Local server")),
    paths(
        crate::api::analyze::analyze,
        crate::api::chat::chat,
        crate::api::capabilities::get_capabilities,
        crate::api::examples::get_examples,
        crate::api::debug::debug_analyze_query,
        crate::api::debug::debug_tools,
        crate::api::health::health_check,
    ),
    components(schemas(AnalyzeBody, ChatBody)),
    tags(
        (name = "analysis", description = "One-shot analysis"),
        (name = "chat", description = "Multi-turn chat"),
        (name = "capabilities", description = "Capabilities and examples"),
        (name = "debug", description = "Debugging"),
        (name = "health", description = "Health checks")
    )
)]
pub struct ApiDoc;

/// Swagger UI at `/docs`, spec at `/api/openapi.json`
pub fn docs_router() -> Router {
    let swagger = SwaggerUi::new("/docs").url("/api/openapi.json", ApiDoc::openapi());
    Router::new().merge(swagger)
}
