//! Request and response types of the assistant service

use crate::intent::Scenario;
use crate::orchestrator::TurnError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;
use wayfarer_tools::ToolSpec;

/// One-shot analysis request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    /// Free-text request
    pub query: String,
    /// Free-text preferences
    #[serde(default)]
    pub preferences: Option<String>,
    /// Structured constraints such as budget or dates
    #[serde(default)]
    pub constraints: Option<BTreeMap<String, Value>>,
}

impl AnalyzeRequest {
    /// Request for `query` with no preferences or constraints
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }
}

/// Metadata attached to an analysis report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Original query
    pub query: String,
    /// Wall time in seconds
    pub processing_time: f64,
    /// Tool calls made
    pub tool_calls_count: usize,
    /// Classifier confidence
    pub analysis_confidence: f32,
    /// Where the evidence came from
    pub data_sources: Vec<String>,
}

/// Result of `TravelAssistant::analyze`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Whether a report was synthesized
    pub success: bool,
    /// Report text, or the generic failure report
    pub response: String,
    /// Analysis label (`租房位置分析`, ...)
    pub analysis_type: String,
    /// Classified scenario
    pub scenario: Scenario,
    /// Tool names in call order
    pub tools_used: Vec<String>,
    /// Run metadata
    pub metadata: ReportMetadata,
    /// Why the turn aborted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<TurnError>,
}

/// How a chat message was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    /// Greeting or question about the assistant, answered directly
    SimpleQa,
    /// Full classify + orchestration turn
    Analysis,
}

/// Result of `TravelAssistant::chat`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    /// Whether the turn completed
    pub success: bool,
    /// Reply text
    pub response: String,
    /// Conversation the turn belongs to
    pub conversation_id: Uuid,
    /// Follow-up prompts
    pub suggestions: Vec<String>,
    /// How the message was handled
    pub message_type: MessageType,
    /// Tool names in call order
    pub tools_used: Vec<String>,
    /// Classifier confidence
    pub confidence: f32,
    /// Why the turn aborted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<TurnError>,
}

/// Static description of what the service can do
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capabilities {
    /// Scenario keys
    pub supported_scenarios: Vec<String>,
    /// Tool specs in registry order
    pub available_tools: Vec<ToolSpec>,
    /// Analysis labels
    pub analysis_types: Vec<String>,
    /// Upstream services
    pub data_sources: Vec<String>,
    /// Sample requests
    pub example_queries: Vec<String>,
}

/// A sample request per category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageExample {
    /// Category label
    pub category: &'static str,
    /// Sample request
    pub query: &'static str,
    /// Analysis steps the request exercises
    pub expected_analysis: Vec<&'static str>,
}

/// Overall service health
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// LLM and map service both reachable
    Healthy,
    /// LLM reachable, map service not
    Degraded,
    /// LLM unreachable
    Unhealthy,
}

impl HealthStatus {
    /// Combine component checks
    #[must_use]
    pub fn from_components(llm_up: bool, map_up: bool) -> Self {
        match (llm_up, map_up) {
            (true, true) => HealthStatus::Healthy,
            (true, false) => HealthStatus::Degraded,
            (false, _) => HealthStatus::Unhealthy,
        }
    }
}

/// Result of one component probe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentHealth {
    /// Whether the probe succeeded
    pub available: bool,
    /// Provider or executor name
    pub provider: String,
    /// Probe latency in milliseconds
    pub latency_ms: u64,
    /// Number of advertised tools, for the map service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools_count: Option<usize>,
    /// Failure detail
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of `TravelAssistant::health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    /// Overall status
    pub status: HealthStatus,
    /// Service version
    pub version: String,
    /// Component probes keyed `llm` and `mcp`
    pub components: BTreeMap<String, ComponentHealth>,
    /// When the probes ran
    pub timestamp: DateTime<Utc>,
}
