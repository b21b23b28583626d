//! Orchestrator configuration
//!
//! Contains configuration types for the orchestrator:
//! - `OrchestratorConfig` for loop settings
//! - `TurnContext` for per-turn input

use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

/// Default cap on DECIDING→CALLING round trips
pub const DEFAULT_MAX_ITERATIONS: usize = 8;

/// Per-turn input besides the intent
#[derive(Debug, Clone, Default)]
pub struct TurnContext {
    /// Raw user request
    pub query: String,
    /// Rendered recent conversation (`用户: ...` / `助手: ...` lines)
    pub history: String,
    /// Free-text preferences
    pub preferences: Option<String>,
    /// Structured constraints such as budget or dates
    pub constraints: BTreeMap<String, Value>,
}

impl TurnContext {
    /// Create a context for `query`
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Attach conversation history
    #[must_use]
    pub fn with_history(mut self, history: impl Into<String>) -> Self {
        self.history = history.into();
        self
    }

    /// Attach preferences
    #[must_use]
    pub fn with_preferences(mut self, preferences: impl Into<String>) -> Self {
        let preferences = preferences.into();
        self.preferences = (!preferences.trim().is_empty()).then_some(preferences);
        self
    }

    /// Attach constraints
    #[must_use]
    pub fn with_constraints(mut self, constraints: BTreeMap<String, Value>) -> Self {
        self.constraints = constraints;
        self
    }
}

/// Configuration for the orchestrator
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Maximum tool calls per turn
    pub max_iterations: usize,
    /// Deadline for each LLM call
    pub llm_timeout: Duration,
    /// Temperature for decision calls
    pub decision_temperature: f32,
    /// Temperature for the synthesis call
    pub synthesis_temperature: f32,
    /// Model override (provider default when `None`)
    pub model: Option<String>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            llm_timeout: Duration::from_secs(60),
            decision_temperature: 0.2,
            synthesis_temperature: 0.1,
            model: None,
        }
    }
}

impl OrchestratorConfig {
    /// Create a new configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum iterations
    #[must_use]
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    /// Set the LLM call timeout
    #[must_use]
    pub fn with_llm_timeout(mut self, timeout: Duration) -> Self {
        self.llm_timeout = timeout;
        self
    }

    /// Use a specific model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}
