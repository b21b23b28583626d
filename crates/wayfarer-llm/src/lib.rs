//! Wayfarer LLM - Provider abstraction for the reasoning backend
//!
//! This crate provides:
//! - Message and completion types shared by every provider
//! - The `LlmProvider` trait used by the classifier and orchestrator
//! - A Google Gemini provider (REST `generateContent`)
//! - A scripted `MockProvider` for tests and offline runs

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod completion;
pub mod error;
pub mod gemini;
pub mod message;
pub mod mock;
pub mod provider;

pub use completion::{CompletionRequest, CompletionResponse, TokenUsage};
pub use error::{Error, Result};
pub use gemini::{GeminiConfig, GeminiProvider};
pub use message::{Message, MessageRole};
pub use mock::MockProvider;
pub use provider::LlmProvider;
