//! Provider-neutral completion request / response

use crate::message::Message;
use serde::{Deserialize, Serialize};

/// Token accounting reported by the backend
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Input side
    pub prompt_tokens: u32,
    /// Output side
    pub completion_tokens: u32,
    /// Sum as reported (may exceed input + output)
    pub total_tokens: u32,
}

/// One completion call
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    /// Model to use; empty means the provider default
    pub model: String,
    /// Ordered conversation
    pub messages: Vec<Message>,
    /// Output cap; `None` uses the provider default
    pub max_tokens: Option<u32>,
    /// Sampling temperature
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    /// Empty request pinned to `model`
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Single-prompt request against the provider's default model
    #[must_use]
    pub fn prompt(text: impl Into<String>) -> Self {
        Self::default().with_message(Message::user(text))
    }

    /// Append a message
    #[must_use]
    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Cap output tokens
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Sampling temperature
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Concatenated text of every user message (used by mocks and logging)
    #[must_use]
    pub fn user_text(&self) -> String {
        self.messages
            .iter()
            .filter(|m| m.role == crate::MessageRole::User)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Text produced by a provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Output text
    pub content: String,
    /// Accounting, when reported
    pub usage: Option<TokenUsage>,
    /// Backend stop reason (`STOP`, `MAX_TOKENS`, ...)
    pub finish_reason: Option<String>,
    /// Model that produced the text
    pub model: String,
}

impl CompletionResponse {
    /// Plain text response, used by mocks
    #[must_use]
    pub fn text(content: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            usage: None,
            finish_reason: Some("stop".to_string()),
            model: model.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MessageRole;

    #[test]
    fn test_completion_request_builder() {
        let request = CompletionRequest::new("gemini-2.0-flash-exp")
            .with_message(Message::system("You are a travel planner"))
            .with_message(Message::user("附近有什么好吃的"))
            .with_max_tokens(256)
            .with_temperature(0.1);

        assert_eq!(request.model, "gemini-2.0-flash-exp");
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.max_tokens, Some(256));
        assert_eq!(request.temperature, Some(0.1));
    }

    #[test]
    fn test_prompt_uses_default_model() {
        let request = CompletionRequest::prompt("hello");
        assert!(request.model.is_empty());
        assert_eq!(request.messages[0].role, MessageRole::User);
        assert_eq!(request.user_text(), "hello");
    }
}
