//! Orchestrator core structure
//!
//! Contains the `Orchestrator` struct and its accessors.

use std::sync::Arc;
use tracing::info;
use wayfarer_llm::LlmProvider;
use wayfarer_tools::ToolRegistry;

use super::config::OrchestratorConfig;

/// Drives one turn through decide → call → synthesize
pub struct Orchestrator {
    pub(crate) llm: Arc<dyn LlmProvider>,
    pub(crate) tools: Arc<ToolRegistry>,
    pub(crate) config: OrchestratorConfig,
}

impl Orchestrator {
    /// Create a new orchestrator
    #[must_use]
    pub fn new(
        llm_provider: Arc<dyn LlmProvider>,
        tool_registry: Arc<ToolRegistry>,
        config: OrchestratorConfig,
    ) -> Self {
        info!(
            provider = %llm_provider.name(),
            tools = tool_registry.list_tools().len(),
            max_iterations = config.max_iterations,
            "Orchestrator created"
        );
        Self {
            llm: llm_provider,
            tools: tool_registry,
            config,
        }
    }

    /// Loop configuration
    #[must_use]
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Tool registry used for calls
    #[must_use]
    pub fn tools(&self) -> &Arc<ToolRegistry> {
        &self.tools
    }

    /// Name of the LLM provider
    #[must_use]
    pub fn provider_name(&self) -> &str {
        self.llm.name()
    }
}
