//! Wayfarer Core - Travel request orchestration
//!
//! This crate provides the orchestration logic of the Wayfarer assistant:
//! - Intent: scenario classification of free-text requests
//! - Orchestrator: the bounded decide / call / synthesize loop
//! - Conversation: per-session history with serialized turns
//! - Assistant: the service facade used by the HTTP layer

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod assistant;
pub mod conversation;
pub mod error;
pub mod intent;
pub mod orchestrator;

pub use assistant::{
    AnalysisReport, AnalyzeRequest, AssistantConfig, Capabilities, ChatReply, ComponentHealth,
    HealthReport, HealthStatus, MessageType, ReportMetadata, TravelAssistant, UsageExample,
};
pub use conversation::{
    ConversationSession, ConversationSnapshot, ConversationStore, Role, StoreConfig, Turn,
    TurnGuard,
};
pub use error::{Error, Result, UserFriendlyError};
pub use intent::{Intent, IntentClassifier, Scenario};
pub use orchestrator::{
    Decision, DecisionKind, OrchestrationState, Orchestrator, OrchestratorConfig, Phase,
    StateSnapshot, TurnContext, TurnError, TurnMetadata, TurnOutcome,
};

/// Re-export so callers can cancel turns without a direct tokio-util dependency
pub use tokio_util::sync::CancellationToken;
