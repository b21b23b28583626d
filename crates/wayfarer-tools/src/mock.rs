//! Mock executor for testing
//!
//! Answers every call from memory: a scripted payload or error per tool,
//! otherwise a small Amap-shaped sample. Calls are recorded so tests can
//! assert what actually reached the executor.

use crate::amap::{MapTool, ToolArgs};
use crate::error::{Error, Result};
use crate::mcp::McpTool;
use crate::registry::MapToolExecutor;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

type ErrorFactory = Box<dyn Fn() -> Error + Send + Sync>;

/// In-memory `MapToolExecutor`
#[derive(Default)]
pub struct MockExecutor {
    payloads: HashMap<MapTool, Value>,
    errors: HashMap<MapTool, ErrorFactory>,
    delay: Option<Duration>,
    advertise: bool,
    calls: AtomicUsize,
    recorded: Mutex<Vec<ToolArgs>>,
}

impl MockExecutor {
    /// Create a mock that answers with sample payloads
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `tool` with `payload`
    #[must_use]
    pub fn with_payload(mut self, tool: MapTool, payload: Value) -> Self {
        self.payloads.insert(tool, payload);
        self
    }

    /// Fail every call to `tool`
    #[must_use]
    pub fn with_error<F>(mut self, tool: MapTool, error: F) -> Self
    where
        F: Fn() -> Error + Send + Sync + 'static,
    {
        self.errors.insert(tool, Box::new(error));
        self
    }

    /// Sleep before answering
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Advertise every map tool from `list_remote_tools`
    #[must_use]
    pub fn with_remote_tools(mut self) -> Self {
        self.advertise = true;
        self
    }

    /// Number of calls that reached the executor
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Arguments of every call, in order
    #[must_use]
    pub fn calls(&self) -> Vec<ToolArgs> {
        self.recorded
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_else(|e| e.into_inner().clone())
    }

    /// Sample payload shaped like the Amap response for `tool`
    #[must_use]
    pub fn sample_payload(tool: MapTool) -> Value {
        match tool {
            MapTool::Geocode => json!({
                "results": [{
                    "country": "中国",
                    "province": "北京市",
                    "city": "北京市",
                    "district": "海淀区",
                    "formatted_address": "北京市海淀区中关村",
                    "location": "116.310003,39.991957",
                    "level": "兴趣点"
                }]
            }),
            MapTool::TransitRoute => json!({
                "origin": "116.310003,39.991957",
                "destination": "116.481488,39.990464",
                "distance": "15200",
                "transits": [{
                    "duration": "2700",
                    "walking_distance": "850",
                    "cost": "5",
                    "segments": [{
                        "walking": {"distance": "320", "duration": "280"},
                        "bus": {"buslines": [{"name": "地铁10号线(内环)"}]}
                    }]
                }]
            }),
            MapTool::WalkingRoute => json!({
                "origin": "116.310003,39.991957",
                "destination": "116.315000,39.995000",
                "paths": [{"distance": "1250", "duration": "1000"}]
            }),
            MapTool::AroundSearch => json!({
                "pois": [
                    {"id": "B000A1", "name": "中关村地铁站", "address": "海淀区中关村大街", "typecode": "150500", "type": "交通设施服务;地铁站;地铁站", "distance": "320"},
                    {"id": "B000A2", "name": "海淀公园", "address": "海淀区新建宫门路", "type": "风景名胜;公园广场;公园", "distance": "860"}
                ]
            }),
            MapTool::TextSearch => json!({
                "suggestion": {"keywords": "", "cities": []},
                "pois": [
                    {"id": "B000B1", "name": "如家酒店(中关村店)", "address": "海淀区海淀大街", "typecode": "100105"},
                    {"id": "B000B2", "name": "汉庭酒店(人民大学店)", "address": "海淀区中关村大街"}
                ]
            }),
        }
    }
}

#[async_trait::async_trait]
impl MapToolExecutor for MockExecutor {
    fn name(&self) -> &str {
        "mock"
    }

    async fn call_tool(&self, args: &ToolArgs) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.recorded
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(args.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let tool = args.tool();
        if let Some(error) = self.errors.get(&tool) {
            return Err(error());
        }
        Ok(self
            .payloads
            .get(&tool)
            .cloned()
            .unwrap_or_else(|| Self::sample_payload(tool)))
    }

    async fn list_remote_tools(&self) -> Result<Vec<McpTool>> {
        if !self.advertise {
            return Ok(Vec::new());
        }
        Ok(MapTool::ALL
            .iter()
            .map(|tool| McpTool {
                name: tool.name().to_string(),
                description: tool.spec().description,
                input_schema: json!({"type": "object"}),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_calls() {
        let mock = MockExecutor::new();
        let args = MapTool::Geocode
            .decode(&json!({"address": "北京市海淀区中关村"}))
            .unwrap();

        let payload = mock.call_tool(&args).await.unwrap();

        assert_eq!(payload["results"][0]["location"], "116.310003,39.991957");
        assert_eq!(mock.call_count(), 1);
        assert_eq!(mock.calls(), vec![args]);
    }

    #[tokio::test]
    async fn test_scripted_error() {
        let mock = MockExecutor::new()
            .with_error(MapTool::TextSearch, || Error::InvalidResponse("bad".into()));
        let args = MapTool::TextSearch
            .decode(&json!({"keywords": "酒店"}))
            .unwrap();
        assert!(mock.call_tool(&args).await.is_err());
    }

    #[tokio::test]
    async fn test_remote_listing() {
        let local = MockExecutor::new().list_remote_tools().await.unwrap();
        assert!(local.is_empty());

        let tools = MockExecutor::new()
            .with_remote_tools()
            .list_remote_tools()
            .await
            .unwrap();
        assert_eq!(tools.len(), MapTool::ALL.len());
        assert_eq!(tools[0].name, "maps_geo");
    }
}
