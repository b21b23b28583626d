//! Mock LLM Provider for testing
//!
//! Replies are served from a FIFO queue first, then from an optional
//! responder closure, then as a fixed `"mock response"`.

use crate::completion::{CompletionRequest, CompletionResponse};
use crate::error::Result;
use crate::provider::LlmProvider;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

type Responder = Box<dyn Fn(&CompletionRequest) -> Result<String> + Send + Sync>;

const MOCK_MODEL: &str = "mock-model";

/// A scripted LLM provider
pub struct MockProvider {
    responses: Mutex<VecDeque<Result<String>>>,
    responder: Option<Responder>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProvider {
    /// Create a new mock provider.
    #[must_use]
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            responder: None,
            delay: None,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a text reply (builder form).
    #[must_use]
    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.push_response(text);
        self
    }

    /// Answer every unqueued request with `f`.
    #[must_use]
    pub fn with_responder<F>(mut self, f: F) -> Self
    where
        F: Fn(&CompletionRequest) -> Result<String> + Send + Sync + 'static,
    {
        self.responder = Some(Box::new(f));
        self
    }

    /// Sleep before answering, to exercise caller timeouts.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue a text reply.
    pub fn push_response(&self, text: impl Into<String>) {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(Ok(text.into()));
    }

    /// Queue a failure.
    pub fn push_error(&self, error: crate::Error) {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(Err(error));
    }

    /// Number of `complete` calls received.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// User text of every request received, in order.
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(CompletionRequest::user_text)
            .collect()
    }
}

#[async_trait::async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn available_models(&self) -> Vec<String> {
        vec![MOCK_MODEL.to_string()]
    }

    fn default_model(&self) -> &str {
        MOCK_MODEL
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let queued = self
            .responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();

        let content = match queued {
            Some(reply) => reply?,
            None => match &self.responder {
                Some(responder) => responder(&request)?,
                None => "mock response".to_string(),
            },
        };

        Ok(CompletionResponse::text(content, MOCK_MODEL))
    }
}
