//! Registry - Tool listing and execution
//!
//! `ToolRegistry::execute` never fails: every outcome, including unknown
//! tools, schema violations and upstream trouble, comes back as a
//! `ToolCallResult` the orchestrator can show to the LLM.

use crate::amap::{MapTool, ToolArgs};
use crate::error::{Error, FailureCategory, Result};
use crate::mcp::McpTool;
use crate::spec::ToolSpec;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{info, instrument, warn};

/// External side of a tool call
#[async_trait::async_trait]
pub trait MapToolExecutor: Send + Sync {
    /// Executor name (for logs and health)
    fn name(&self) -> &str;

    /// Perform one validated call and return the decoded payload
    async fn call_tool(&self, args: &ToolArgs) -> Result<Value>;

    /// Tools advertised by the remote side
    async fn list_remote_tools(&self) -> Result<Vec<McpTool>> {
        Ok(Vec::new())
    }
}

/// Registry configuration
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Deadline for one external call
    pub call_timeout: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(30),
        }
    }
}

impl RegistryConfig {
    /// Set the per-call timeout
    #[must_use]
    pub fn with_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }
}

/// Outcome of a tool call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallStatus {
    /// Upstream returned data
    Success,
    /// Validation or upstream failure
    Failure,
}

/// Result of one tool execution, immutable once created
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallResult {
    /// Requested tool name, verbatim
    pub tool_name: String,
    /// Arguments as requested
    pub arguments: Value,
    /// Success or failure
    pub status: CallStatus,
    /// Decoded upstream data on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    /// What went wrong on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
    /// Failure category
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<FailureCategory>,
    /// Why the LLM asked for this call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Execution duration in milliseconds
    pub duration_ms: u64,
}

impl ToolCallResult {
    /// Create a successful result
    #[must_use]
    pub fn success(
        tool_name: impl Into<String>,
        arguments: Value,
        payload: Value,
        duration_ms: u64,
    ) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments,
            status: CallStatus::Success,
            payload: Some(payload),
            error_detail: None,
            category: None,
            reason: None,
            duration_ms,
        }
    }

    /// Create a failed result
    #[must_use]
    pub fn failure(
        tool_name: impl Into<String>,
        arguments: Value,
        error: &Error,
        duration_ms: u64,
    ) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments,
            status: CallStatus::Failure,
            payload: None,
            error_detail: Some(error.to_string()),
            category: Some(error.category()),
            reason: None,
            duration_ms,
        }
    }

    /// Attach the LLM's stated reason
    #[must_use]
    pub fn with_reason(mut self, reason: Option<String>) -> Self {
        self.reason = reason;
        self
    }

    /// Whether the call succeeded
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == CallStatus::Success
    }

    /// Resolved tool, if the name was known
    #[must_use]
    pub fn tool(&self) -> Option<MapTool> {
        MapTool::from_name(&self.tool_name)
    }
}

/// Registry of the mapping tools backed by one executor
pub struct ToolRegistry {
    executor: Arc<dyn MapToolExecutor>,
    config: RegistryConfig,
    specs: Vec<ToolSpec>,
}

impl ToolRegistry {
    /// Create a registry over `executor`
    #[must_use]
    pub fn new(executor: Arc<dyn MapToolExecutor>, config: RegistryConfig) -> Self {
        Self {
            executor,
            config,
            specs: MapTool::ALL.iter().map(MapTool::spec).collect(),
        }
    }

    /// Create with default configuration
    #[must_use]
    pub fn with_defaults(executor: Arc<dyn MapToolExecutor>) -> Self {
        Self::new(executor, RegistryConfig::default())
    }

    /// All tool specs in stable order
    #[must_use]
    pub fn list_tools(&self) -> &[ToolSpec] {
        &self.specs
    }

    /// Tool names in stable order
    #[must_use]
    pub fn list_names(&self) -> Vec<&str> {
        self.specs.iter().map(|s| s.name.as_str()).collect()
    }

    /// Spec for `name`
    #[must_use]
    pub fn get_spec(&self, name: &str) -> Option<&ToolSpec> {
        self.specs.iter().find(|s| s.name == name)
    }

    /// Resolve `name` to its variant
    pub fn resolve(&self, name: &str) -> Result<MapTool> {
        MapTool::from_name(name).ok_or_else(|| Error::UnknownTool(name.to_string()))
    }

    /// Menu text for decision prompts
    #[must_use]
    pub fn describe(&self) -> String {
        self.specs
            .iter()
            .map(ToolSpec::describe)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// The executor behind this registry
    #[must_use]
    pub fn executor(&self) -> &Arc<dyn MapToolExecutor> {
        &self.executor
    }

    /// Execute a tool by name
    #[instrument(skip(self, arguments), fields(tool = %name))]
    pub async fn execute(&self, name: &str, arguments: Value) -> ToolCallResult {
        let start = Instant::now();
        let outcome = self.dispatch(name, &arguments).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(payload) => {
                info!(tool = %name, duration_ms, "Tool call succeeded");
                ToolCallResult::success(name, arguments, payload, duration_ms)
            }
            Err(e) => {
                warn!(
                    tool = %name,
                    category = %e.category(),
                    error = %e,
                    duration_ms,
                    "Tool call failed"
                );
                ToolCallResult::failure(name, arguments, &e, duration_ms)
            }
        }
    }

    async fn dispatch(&self, name: &str, arguments: &Value) -> Result<Value> {
        let tool = self.resolve(name)?;
        let args = tool.decode(arguments)?;

        match timeout(self.config.call_timeout, self.executor.call_tool(&args)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(self.config.call_timeout.as_millis() as u64)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockExecutor;
    use serde_json::json;

    fn registry(executor: Arc<MockExecutor>) -> ToolRegistry {
        ToolRegistry::with_defaults(executor)
    }

    #[test]
    fn test_list_tools_stable_order() {
        let registry = registry(Arc::new(MockExecutor::new()));
        assert_eq!(
            registry.list_names(),
            vec![
                "maps_geo",
                "maps_direction_transit_integrated",
                "maps_direction_walking",
                "maps_around_search",
                "maps_text_search",
            ]
        );
        assert!(registry.get_spec("maps_geo").is_some());
        assert!(registry.describe().contains("**maps_text_search**"));
    }

    #[tokio::test]
    async fn test_execute_success() {
        let executor = Arc::new(
            MockExecutor::new().with_payload(MapTool::Geocode, json!({"results": []})),
        );
        let registry = registry(executor.clone());

        let result = registry
            .execute("maps_geo", json!({"address": "北京市朝阳区"}))
            .await;

        assert!(result.is_success());
        assert_eq!(result.payload, Some(json!({"results": []})));
        assert_eq!(executor.call_count(), 1);
    }

    #[tokio::test]
    async fn test_schema_violation_never_reaches_executor() {
        let executor = Arc::new(MockExecutor::new());
        let registry = registry(executor.clone());

        let result = registry.execute("maps_geo", json!({"city": "北京"})).await;

        assert_eq!(result.status, CallStatus::Failure);
        assert_eq!(result.category, Some(FailureCategory::InvalidArguments));
        assert!(result.error_detail.unwrap().contains("address"));
        assert_eq!(executor.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let executor = Arc::new(MockExecutor::new());
        let registry = registry(executor.clone());

        assert!(matches!(
            registry.resolve("maps_weather"),
            Err(Error::UnknownTool(_))
        ));

        let result = registry
            .execute("maps_weather", json!({"city": "北京"}))
            .await;
        assert_eq!(result.category, Some(FailureCategory::UnknownTool));
        assert_eq!(executor.call_count(), 0);
    }

    #[tokio::test]
    async fn test_timeout_becomes_failure() {
        let executor = Arc::new(MockExecutor::new().with_delay(Duration::from_millis(500)));
        let registry = ToolRegistry::new(
            executor,
            RegistryConfig::default().with_timeout(Duration::from_millis(20)),
        );

        let result = registry
            .execute("maps_text_search", json!({"keywords": "酒店"}))
            .await;

        assert_eq!(result.category, Some(FailureCategory::Timeout));
        assert!(result.error_detail.unwrap().contains("timeout"));
    }

    #[tokio::test]
    async fn test_upstream_error_categorized() {
        let executor = Arc::new(
            MockExecutor::new()
                .with_error(MapTool::TextSearch, || Error::Upstream("HTTP 502".into())),
        );
        let registry = registry(executor);

        let result = registry
            .execute("maps_text_search", json!({"keywords": "川菜"}))
            .await;
        assert_eq!(result.category, Some(FailureCategory::UpstreamError));
    }

    #[test]
    fn test_tool_call_result_serialization() {
        let result = ToolCallResult::failure(
            "maps_geo",
            json!({}),
            &Error::invalid("maps_geo", "missing required field `address`"),
            0,
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "failure");
        assert_eq!(json["category"], "invalid_arguments");
        assert!(json.get("payload").is_none());
    }
}
