//! The reasoning backend seam
//!
//! Callers treat a provider as `infer(prompt) -> text` and apply their own
//! timeout policy around `complete`.

use crate::completion::{CompletionRequest, CompletionResponse};
use crate::error::Result;

/// A text-completion backend
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Short backend name reported in metadata and health (`gemini`, `mock`)
    fn name(&self) -> &str;

    /// Models the backend accepts in `CompletionRequest::model`
    fn available_models(&self) -> Vec<String>;

    /// Model used when the request leaves `model` empty
    fn default_model(&self) -> &str;

    /// Run one completion
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;
}
