//! Multi-turn chat endpoint

use super::error::ApiError;
use super::AppState;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;
use wayfarer_core::{CancellationToken, ChatReply, MessageType};

/// Chat request body
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ChatBody {
    /// User message
    pub message: String,
    /// Existing conversation; omit to start a new one
    #[serde(default)]
    pub conversation_id: Option<String>,
}

/// Chat response body
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub success: bool,
    pub response: String,
    pub conversation_id: Uuid,
    pub suggestions: Vec<String>,
    pub metadata: ChatMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatMetadata {
    pub message_type: MessageType,
    pub confidence: f32,
    pub tools_used: Vec<String>,
}

impl From<ChatReply> for ChatResponse {
    fn from(reply: ChatReply) -> Self {
        let (error, message) = match reply.error {
            Some(e) => (Some(e.code), Some(e.message)),
            None => (None, None),
        };

        Self {
            success: reply.success,
            response: reply.response,
            conversation_id: reply.conversation_id,
            suggestions: reply.suggestions,
            metadata: ChatMetadata {
                message_type: reply.message_type,
                confidence: reply.confidence,
                tools_used: reply.tools_used,
            },
            error,
            message,
        }
    }
}

pub fn chat_routes() -> Router<AppState> {
    Router::new().route("/chat", post(chat))
}

/// Handle one chat turn
#[utoipa::path(
    post,
    path = "/chat",
    tag = "chat",
    request_body = ChatBody,
    responses(
        (status = 200, description = "Reply; success=false when the report could not be generated"),
        (status = 400, description = "Empty message"),
        (status = 404, description = "Unknown or expired conversation_id")
    )
)]
pub async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatBody>,
) -> Result<Json<ChatResponse>, ApiError> {
    let message = body.message.trim();
    if message.is_empty() {
        return Err(ApiError::bad_request("message must not be empty"));
    }

    info!(
        conversation_id = body.conversation_id.as_deref().unwrap_or("new"),
        "Processing chat message"
    );

    let cancel = CancellationToken::new();
    let _cancel_on_drop = cancel.clone().drop_guard();

    let reply = state
        .assistant
        .chat(message, body.conversation_id.as_deref(), &cancel)
        .await?;

    Ok(Json(reply.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{state_with, test_state, travel_llm, RENTAL_QUERY};
    use axum::http::StatusCode;
    use wayfarer_tools::MockExecutor;

    fn body(message: &str, conversation_id: Option<String>) -> ChatBody {
        ChatBody {
            message: message.to_string(),
            conversation_id,
        }
    }

    #[tokio::test]
    async fn test_chat_starts_conversation() {
        let state = test_state();

        let first = chat(State(state.clone()), Json(body("你好", None)))
            .await
            .unwrap();
        let second = chat(State(state), Json(body("你好", None))).await.unwrap();

        assert!(first.0.success);
        assert_eq!(first.0.metadata.message_type, MessageType::SimpleQa);
        assert!(!first.0.conversation_id.is_nil());
        assert_ne!(first.0.conversation_id, second.0.conversation_id);
    }

    #[tokio::test]
    async fn test_chat_continues_conversation() {
        let state = test_state();

        let first = chat(State(state.clone()), Json(body("你好", None)))
            .await
            .unwrap();
        let id = first.0.conversation_id;

        let second = chat(
            State(state.clone()),
            Json(body(RENTAL_QUERY, Some(id.to_string()))),
        )
        .await
        .unwrap();

        assert!(second.0.success);
        assert_eq!(second.0.conversation_id, id);
        assert_eq!(second.0.metadata.message_type, MessageType::Analysis);
        assert!(!second.0.suggestions.is_empty());

        let snapshot = state.assistant.store().snapshot_state(id).await.unwrap();
        assert_eq!(snapshot.turn_count, 4);
    }

    #[tokio::test]
    async fn test_chat_unknown_conversation() {
        let unknown = Uuid::new_v4().to_string();

        let err = chat(State(test_state()), Json(body("你好", Some(unknown))))
            .await
            .unwrap_err();

        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.body.error, "session_not_found");
    }

    #[tokio::test]
    async fn test_chat_failure_echoes_conversation() {
        let state = state_with(travel_llm(false), MockExecutor::new());

        let response = chat(State(state.clone()), Json(body(RENTAL_QUERY, None)))
            .await
            .unwrap();

        assert!(!response.0.success);
        assert_eq!(response.0.error.as_deref(), Some("synthesis_failed"));

        let snapshot = state
            .assistant
            .store()
            .snapshot_state(response.0.conversation_id)
            .await
            .unwrap();
        assert_eq!(snapshot.turn_count, 0);
    }

    #[tokio::test]
    async fn test_chat_empty_message() {
        let err = chat(State(test_state()), Json(body("", None)))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
