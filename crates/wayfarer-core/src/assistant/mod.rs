//! Travel assistant service
//!
//! `TravelAssistant` ties the classifier, the orchestrator and the
//! conversation store together behind the operations the HTTP layer
//! exposes: one-shot analysis, multi-turn chat, capability listing,
//! intent debugging and health probes.

mod catalog;
mod simple;
mod types;


pub use catalog::{usage_examples, DATA_SOURCES, EXAMPLE_QUERIES};
pub use simple::{is_simple_question, FALLBACK_GREETING};
pub use types::{
    AnalysisReport, AnalyzeRequest, Capabilities, ChatReply, ComponentHealth, HealthReport,
    HealthStatus, MessageType, ReportMetadata, UsageExample,
};

use crate::conversation::{ConversationStore, StoreConfig};
use crate::error::{Error, Result};
use crate::intent::{Intent, IntentClassifier, Scenario};
use crate::orchestrator::{Orchestrator, OrchestratorConfig, TurnContext};
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use wayfarer_llm::{CompletionRequest, LlmProvider};
use wayfarer_tools::{McpTool, ToolRegistry};

/// Confidence reported for direct replies
const SIMPLE_REPLY_CONFIDENCE: f32 = 0.8;

/// Assistant configuration
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    /// Version reported by health probes
    pub version: String,
    /// Loop settings
    pub orchestrator: OrchestratorConfig,
    /// Conversation store settings
    pub store: StoreConfig,
    /// Deadline for each health probe
    pub health_timeout: Duration,
    /// Temperature for direct chat replies
    pub chat_temperature: f32,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            orchestrator: OrchestratorConfig::default(),
            store: StoreConfig::default(),
            health_timeout: Duration::from_secs(10),
            chat_temperature: 0.7,
        }
    }
}

impl AssistantConfig {
    /// Set the reported version
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Set the loop settings
    #[must_use]
    pub fn with_orchestrator(mut self, orchestrator: OrchestratorConfig) -> Self {
        self.orchestrator = orchestrator;
        self
    }

    /// Set the store settings
    #[must_use]
    pub fn with_store(mut self, store: StoreConfig) -> Self {
        self.store = store;
        self
    }
}

/// The assistant service
pub struct TravelAssistant {
    llm: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    classifier: IntentClassifier,
    orchestrator: Orchestrator,
    store: Arc<ConversationStore>,
    config: AssistantConfig,
}

impl TravelAssistant {
    /// Create the service over an LLM provider and a tool registry
    #[must_use]
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        tools: Arc<ToolRegistry>,
        config: AssistantConfig,
    ) -> Self {
        let mut classifier = IntentClassifier::new(llm.clone(), config.orchestrator.llm_timeout);
        if let Some(model) = &config.orchestrator.model {
            classifier = classifier.with_model(model.clone());
        }
        let orchestrator =
            Orchestrator::new(llm.clone(), tools.clone(), config.orchestrator.clone());
        let store = Arc::new(ConversationStore::new(config.store.clone()));

        Self {
            llm,
            tools,
            classifier,
            orchestrator,
            store,
            config,
        }
    }

    /// Share an existing conversation store
    #[must_use]
    pub fn with_store(mut self, store: Arc<ConversationStore>) -> Self {
        self.store = store;
        self
    }

    /// Conversation store
    #[must_use]
    pub fn store(&self) -> &Arc<ConversationStore> {
        &self.store
    }

    /// Tool registry
    #[must_use]
    pub fn tools(&self) -> &Arc<ToolRegistry> {
        &self.tools
    }

    /// Service configuration
    #[must_use]
    pub fn config(&self) -> &AssistantConfig {
        &self.config
    }

    /// Classify a query without running the loop
    pub async fn classify(&self, query: &str) -> Intent {
        self.classifier.classify(query).await
    }

    /// One-shot analysis: classify, orchestrate, report
    #[instrument(skip_all, fields(query = %request.query))]
    pub async fn analyze(
        &self,
        request: AnalyzeRequest,
        cancel: &CancellationToken,
    ) -> AnalysisReport {
        let intent = self.classify(&request.query).await;

        let mut ctx = TurnContext::new(request.query.clone());
        if let Some(preferences) = request.preferences {
            ctx = ctx.with_preferences(preferences);
        }
        if let Some(constraints) = request.constraints {
            ctx = ctx.with_constraints(constraints);
        }

        let outcome = self
            .orchestrator
            .run_with_cancel(intent.clone(), ctx, cancel)
            .await;

        AnalysisReport {
            success: outcome.is_success(),
            analysis_type: intent.scenario.label().to_string(),
            scenario: intent.scenario,
            tools_used: outcome.metadata.tools_used.clone(),
            metadata: ReportMetadata {
                query: request.query,
                processing_time: outcome.metadata.processing_time_secs(),
                tool_calls_count: outcome.metadata.tool_calls_count,
                analysis_confidence: intent.confidence,
                data_sources: outcome.metadata.data_sources.iter().cloned().collect(),
            },
            response: outcome.final_text,
            error: outcome.error,
        }
    }

    /// One chat turn.
    ///
    /// A missing id starts a new conversation. An id that is malformed or
    /// unknown is `Error::SessionNotFound`. History is only written when
    /// the turn completes; cancellation returns `Error::Cancelled`.
    #[instrument(skip_all, fields(conversation_id = conversation_id.unwrap_or("new")))]
    pub async fn chat(
        &self,
        message: &str,
        conversation_id: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<ChatReply> {
        let id = match conversation_id.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => {
                let id =
                    Uuid::parse_str(raw).map_err(|_| Error::SessionNotFound(raw.to_string()))?;
                self.store.get_or_create(Some(id)).await?.conversation_id
            }
            None => self.store.get_or_create(None).await?.conversation_id,
        };

        let guard = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            guard = self.store.begin_turn(id) => guard?,
        };
        let context = guard.context();

        if is_simple_question(message) {
            let response = self.simple_reply(message, &context, cancel).await?;
            guard.commit(message, response.clone(), None);
            info!(conversation_id = %id, "Answered simple question");

            return Ok(ChatReply {
                success: true,
                response,
                conversation_id: id,
                suggestions: suggestions(Scenario::Unclassified),
                message_type: MessageType::SimpleQa,
                tools_used: Vec::new(),
                confidence: SIMPLE_REPLY_CONFIDENCE,
                error: None,
            });
        }

        let intent = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            intent = self.classify(message) => intent,
        };

        let ctx = TurnContext::new(message).with_history(context);
        let outcome = self
            .orchestrator
            .run_with_cancel(intent.clone(), ctx, cancel)
            .await;

        if outcome.is_cancelled() {
            return Err(Error::Cancelled);
        }

        if outcome.is_success() {
            let snapshot = outcome.snapshot(&intent);
            guard.commit(message, outcome.final_text.clone(), Some(snapshot));
        } else {
            warn!(conversation_id = %id, "Turn failed, history unchanged");
            drop(guard);
        }

        Ok(ChatReply {
            success: outcome.is_success(),
            response: outcome.final_text,
            conversation_id: id,
            suggestions: suggestions(intent.scenario),
            message_type: MessageType::Analysis,
            tools_used: outcome.metadata.tools_used,
            confidence: intent.confidence,
            error: outcome.error,
        })
    }

    async fn simple_reply(
        &self,
        message: &str,
        context: &str,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let mut request = CompletionRequest::prompt(simple::simple_chat_prompt(message, context))
            .with_temperature(self.config.chat_temperature);
        if let Some(model) = &self.config.orchestrator.model {
            request.model = model.clone();
        }

        let deadline = self.config.orchestrator.llm_timeout;
        let reply = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            reply = timeout(deadline, self.llm.complete(request)) => reply,
        };

        Ok(match reply {
            Ok(Ok(response)) if !response.content.trim().is_empty() => response.content,
            Ok(Ok(_)) => FALLBACK_GREETING.to_string(),
            Ok(Err(e)) => {
                warn!(error = %e, "Simple chat reply failed, using greeting");
                FALLBACK_GREETING.to_string()
            }
            Err(_) => {
                warn!(
                    timeout_ms = deadline.as_millis() as u64,
                    "Simple chat reply timed out, using greeting"
                );
                FALLBACK_GREETING.to_string()
            }
        })
    }

    /// What the service supports
    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            supported_scenarios: owned(Scenario::CLASSIFIED.iter().map(|s| s.key())),
            available_tools: self.tools.list_tools().to_vec(),
            analysis_types: owned(Scenario::CLASSIFIED.iter().map(|s| s.label())),
            data_sources: owned(DATA_SOURCES.iter().copied()),
            example_queries: owned(EXAMPLE_QUERIES.iter().copied()),
        }
    }

    /// Tools advertised by the remote map service
    pub async fn remote_tools(&self) -> wayfarer_tools::Result<Vec<McpTool>> {
        self.tools.executor().list_remote_tools().await
    }

    /// Probe the LLM and the map service
    #[instrument(skip(self))]
    pub async fn health(&self) -> HealthReport {
        let (llm, mcp) = tokio::join!(self.probe_llm(), self.probe_map());
        let status = HealthStatus::from_components(llm.available, mcp.available);

        info!(status = ?status, llm = llm.available, mcp = mcp.available, "Health probed");

        let mut components = BTreeMap::new();
        components.insert("llm".to_string(), llm);
        components.insert("mcp".to_string(), mcp);

        HealthReport {
            status,
            version: self.config.version.clone(),
            components,
            timestamp: Utc::now(),
        }
    }

    async fn probe_llm(&self) -> ComponentHealth {
        let start = Instant::now();
        let request = CompletionRequest::prompt("测试连接").with_max_tokens(16);
        let probe = timeout(self.config.health_timeout, self.llm.complete(request)).await;

        let error = match probe {
            Ok(Ok(_)) => None,
            Ok(Err(e)) => Some(e.to_string()),
            Err(_) => Some(timeout_note(self.config.health_timeout)),
        };

        ComponentHealth {
            available: error.is_none(),
            provider: self.llm.name().to_string(),
            latency_ms: start.elapsed().as_millis() as u64,
            tools_count: None,
            error,
        }
    }

    async fn probe_map(&self) -> ComponentHealth {
        let start = Instant::now();
        let executor = self.tools.executor();
        let probe = timeout(self.config.health_timeout, executor.list_remote_tools()).await;

        let (tools_count, error) = match probe {
            Ok(Ok(tools)) if tools.is_empty() => {
                (Some(0), Some("no tools advertised".to_string()))
            }
            Ok(Ok(tools)) => (Some(tools.len()), None),
            Ok(Err(e)) => (None, Some(e.to_string())),
            Err(_) => (None, Some(timeout_note(self.config.health_timeout))),
        };

        ComponentHealth {
            available: error.is_none(),
            provider: executor.name().to_string(),
            latency_ms: start.elapsed().as_millis() as u64,
            tools_count,
            error,
        }
    }

    /// Sample requests per category
    #[must_use]
    pub fn examples(&self) -> Vec<UsageExample> {
        usage_examples()
    }
}

fn suggestions(scenario: Scenario) -> Vec<String> {
    owned(scenario.suggestions().iter().copied())
}

fn owned<'a>(items: impl Iterator<Item = &'a str>) -> Vec<String> {
    items.map(str::to_string).collect()
}

fn timeout_note(deadline: Duration) -> String {
    format!("timeout after {}ms", deadline.as_millis())
}
