//! Shared fixtures for handler tests

use super::AppState;
use std::sync::Arc;
use wayfarer_core::orchestrator::{DECISION_MARKER, SYNTHESIS_MARKER};
use wayfarer_core::{AssistantConfig, TravelAssistant};
use wayfarer_llm::{CompletionRequest, Error as LlmError, MockProvider};
use wayfarer_tools::{MockExecutor, ToolRegistry};

pub const CLASSIFY_MARKER: &str = "请分析以下用户查询的意图和需求类型";
pub const RENTAL_QUERY: &str = "我在北京海淀区和朝阳区都有工作，想找一个通勤方便的房子";
pub const REPORT: &str = "## 租房位置分析报告\n推荐中关村一带。";

const RENTAL_INTENT: &str = r#"{"analysis_type": "租房位置分析", "confidence": 0.9, "location_info": ["北京海淀区", "北京朝阳区"], "recommended_tools": ["maps_geo"], "analysis_plan": ["定位工作地点", "比较通勤"]}"#;
const CALL_GEO: &str = "CALL_TOOL\n工具名称: maps_geo\n参数: {\"address\": \"北京市海淀区\"}";

/// LLM that classifies as rental, geocodes once, then writes `REPORT`
pub fn travel_llm(synthesis_ok: bool) -> MockProvider {
    MockProvider::new().with_responder(move |req: &CompletionRequest| {
        let prompt = req.user_text();
        if prompt.contains(CLASSIFY_MARKER) {
            Ok(RENTAL_INTENT.to_string())
        } else if prompt.contains(SYNTHESIS_MARKER) {
            if synthesis_ok {
                Ok(REPORT.to_string())
            } else {
                Err(LlmError::ServerError("503".to_string()))
            }
        } else if prompt.contains(DECISION_MARKER) {
            if prompt.contains("maps_geo - 成功") {
                Ok("GENERATE_FINAL_RESPONSE".to_string())
            } else {
                Ok(CALL_GEO.to_string())
            }
        } else {
            Ok("您好，我是出行助手。".to_string())
        }
    })
}

pub fn state_with(llm: MockProvider, executor: MockExecutor) -> AppState {
    let tools = Arc::new(ToolRegistry::with_defaults(Arc::new(executor)));
    AppState::new(Arc::new(TravelAssistant::new(
        Arc::new(llm),
        tools,
        AssistantConfig::default(),
    )))
}

pub fn test_state() -> AppState {
    state_with(travel_llm(true), MockExecutor::new().with_remote_tools())
}
