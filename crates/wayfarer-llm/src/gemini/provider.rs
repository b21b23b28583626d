//! Gemini provider implementation

use super::config::{GeminiConfig, MODELS};
use super::types::{
    Content, ErrorEnvelope, GenerateContentRequest, GenerateContentResponse, GenerationSettings,
    Part,
};
use crate::completion::{CompletionRequest, CompletionResponse, TokenUsage};
use crate::error::{Error, Result};
use crate::message::{Message, MessageRole};
use crate::provider::LlmProvider;
use reqwest::Client;
use secrecy::ExposeSecret;
use tracing::{debug, instrument, warn};

/// Google Gemini provider
pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
}

impl GeminiProvider {
    /// Create a new Gemini provider
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(GeminiConfig::from_env()?)
    }

    fn map_transport_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout(self.config.timeout.as_millis() as u64)
        } else {
            Error::Network(self.redact(&err.to_string()))
        }
    }

    /// Strip the API key from anything that may end up in logs or responses
    fn redact(&self, text: &str) -> String {
        let key = self.config.api_key.expose_secret();
        if key.is_empty() {
            text.to_string()
        } else {
            text.replace(key, "[REDACTED]")
        }
    }

    async fn post(
        &self,
        model: &str,
        body: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        // The URL carries the key; log the model only.
        debug!(model = %model, "Sending request to Gemini");

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.config.base_url,
            model,
            self.config.api_key.expose_secret()
        );

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if status.is_success() {
            return serde_json::from_str(&text).map_err(|e| Error::InvalidResponse(e.to_string()));
        }

        warn!(status = %status, "Gemini rejected the request");
        let detail = self.redact(
            &serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|e| e.describe())
                .unwrap_or_else(|_| format!("HTTP {}", status)),
        );

        Err(match status.as_u16() {
            429 => Error::RateLimit,
            code if code >= 500 => Error::ServerError(detail),
            _ => Error::Api(detail),
        })
    }
}

/// System messages become `systemInstruction`; the assistant role is `model`.
pub(crate) fn split_messages(messages: &[Message]) -> (Option<Content>, Vec<Content>) {
    let mut instruction = Vec::new();
    let mut contents = Vec::with_capacity(messages.len());

    for message in messages {
        match message.role {
            MessageRole::System => instruction.push(Part::text(&message.content)),
            MessageRole::User => contents.push(Content::with_role("user", &message.content)),
            MessageRole::Assistant => contents.push(Content::with_role("model", &message.content)),
        }
    }

    let instruction = (!instruction.is_empty()).then(|| Content::instruction(instruction));
    (instruction, contents)
}

#[async_trait::async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn available_models(&self) -> Vec<String> {
        MODELS.iter().map(|s| (*s).to_string()).collect()
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let model = match request.model.as_str() {
            "" => self.config.default_model.clone(),
            explicit => explicit.to_string(),
        };

        let (system_instruction, contents) = split_messages(&request.messages);
        let body = GenerateContentRequest {
            contents,
            system_instruction,
            generation_config: GenerationSettings {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens.unwrap_or(self.config.default_max_tokens),
                candidate_count: 1,
            },
        };

        let response = self.post(&model, &body).await?;
        let Some(candidate) = response.candidates.first() else {
            return Err(Error::InvalidResponse(
                "response has no candidates".to_string(),
            ));
        };

        let content = candidate.text();
        if content.trim().is_empty() {
            return Err(Error::InvalidResponse(format!(
                "empty candidate (finish_reason={:?})",
                candidate.finish_reason
            )));
        }

        Ok(CompletionResponse {
            content,
            finish_reason: candidate.finish_reason.clone(),
            usage: response.usage_metadata.map(TokenUsage::from),
            model,
        })
    }
}
