//! Google Gemini provider
//!
//! Talks to the public `generativelanguage.googleapis.com` REST API with an
//! API key. Only text completion is used; tool selection is driven by the
//! orchestrator's own directive protocol.

mod config;
mod provider;
mod types;

pub use config::{GeminiConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use provider::GeminiProvider;
