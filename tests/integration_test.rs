//! Integration tests for Wayfarer
//!
//! Drives `TravelAssistant` through the real Gemini and Amap MCP clients
//! against local stand-in servers:
//! - wayfarer-llm: Gemini `generateContent` wire format
//! - wayfarer-tools: MCP initialize / tools/list / tools/call
//! - wayfarer-core: classification, orchestration loop, conversation store

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wayfarer_core::orchestrator::{DECISION_MARKER, SYNTHESIS_MARKER};
use wayfarer_core::{
    AnalyzeRequest, AssistantConfig, CancellationToken, HealthStatus, MessageType, Scenario,
    TravelAssistant,
};
use wayfarer_llm::{GeminiConfig, GeminiProvider};
use wayfarer_tools::{AmapMcpClient, AmapMcpConfig, RegistryConfig, ToolRegistry};

const RENTAL_QUERY: &str = "我在北京海淀区和朝阳区都有工作，想找一个通勤方便的房子";
const CLASSIFY_MARKER: &str = "请分析以下用户查询的意图和需求类型";
const REPORT: &str = "## 租房位置分析报告\n海淀与朝阳之间的望京、中关村均可考虑。";

// ============================================================================
// Stand-in servers
// ============================================================================

#[derive(Default)]
struct Recorder {
    gemini_models: Vec<String>,
    mcp_methods: Vec<String>,
    tool_calls: Vec<Value>,
}

type Shared = Arc<Mutex<Recorder>>;

fn gemini_reply(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }],
        "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 5, "totalTokenCount": 15}
    })
}

async fn fake_gemini(
    State(recorder): State<Shared>,
    Path(call): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Response {
    if query.get("key").map(String::as_str) != Some("gemini-test-key") {
        let error = json!({
            "error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}
        });
        return (StatusCode::BAD_REQUEST, Json(error)).into_response();
    }

    let model = call.split(':').next().unwrap_or_default().to_string();
    recorder.lock().unwrap().gemini_models.push(model);

    let prompt: String = body["contents"]
        .as_array()
        .into_iter()
        .flatten()
        .flat_map(|c| c["parts"].as_array().cloned().unwrap_or_default())
        .filter_map(|p| p["text"].as_str().map(str::to_string))
        .collect::<Vec<_>>()
        .join("\n");

    let text = if prompt.contains(CLASSIFY_MARKER) {
        json!({
            "analysis_type": "租房位置分析",
            "confidence": 0.88,
            "location_info": ["北京海淀区", "北京朝阳区"],
            "constraints": [],
            "recommended_tools": ["maps_geo", "maps_direction_transit_integrated"],
            "analysis_plan": ["定位两个工作地点", "比较通勤时间"]
        })
        .to_string()
    } else if prompt.contains(SYNTHESIS_MARKER) {
        REPORT.to_string()
    } else if prompt.contains(DECISION_MARKER) {
        if prompt.contains("maps_geo - 成功") {
            "GENERATE_FINAL_RESPONSE\n原因: 已获取工作地点坐标".to_string()
        } else {
            "CALL_TOOL\n工具名称: maps_geo\n参数: {\"address\": \"北京市海淀区\"}\n原因: 先定位工作地点"
                .to_string()
        }
    } else {
        "您好！我是出行助手，可以帮您分析租房位置和规划行程。".to_string()
    };

    Json(gemini_reply(&text)).into_response()
}

async fn fake_mcp(
    State(recorder): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Response {
    if query.get("key").map(String::as_str) != Some("amap-test-key") {
        return (StatusCode::UNAUTHORIZED, "INVALID_USER_KEY").into_response();
    }

    let method = body["method"].as_str().unwrap_or_default().to_string();
    recorder.lock().unwrap().mcp_methods.push(method.clone());
    let id = body["id"].clone();

    match method.as_str() {
        "initialize" => Json(json!({
            "jsonrpc": "2.0",
            "id": id,
            "result": {"protocolVersion": "2024-11-05", "serverInfo": {"name": "amap-test"}}
        }))
        .into_response(),
        "notifications/initialized" => StatusCode::ACCEPTED.into_response(),
        "tools/list" => Json(json!({
            "jsonrpc": "2.0",
            "id": id,
            "result": {"tools": [
                {"name": "maps_geo", "description": "地理编码"},
                {"name": "maps_around_search", "description": "周边搜索"}
            ]}
        }))
        .into_response(),
        "tools/call" => {
            let params = body["params"].clone();
            recorder.lock().unwrap().tool_calls.push(params);
            let text = json!({
                "results": [{
                    "formatted_address": "北京市海淀区",
                    "location": "116.298056,39.959912",
                    "level": "区县"
                }]
            })
            .to_string();
            Json(json!({
                "jsonrpc": "2.0",
                "id": id,
                "result": {"content": [{"type": "text", "text": text}], "isError": false}
            }))
            .into_response()
        }
        _ => Json(json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": {"code": -32601, "message": "method not found"}
        }))
        .into_response(),
    }
}

async fn spawn_upstreams(recorder: Shared) -> SocketAddr {
    let app = Router::new()
        .route("/v1beta/models/:call", post(fake_gemini))
        .route("/mcp", post(fake_mcp))
        .with_state(recorder);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn live_assistant(recorder: Shared) -> TravelAssistant {
    let addr = spawn_upstreams(recorder).await;

    let gemini = GeminiProvider::new(
        GeminiConfig::new("gemini-test-key")
            .with_base_url(format!("http://{}/v1beta", addr))
            .with_model("gemini-test")
            .with_timeout(Duration::from_secs(5)),
    )
    .unwrap();

    let mcp = AmapMcpClient::new(
        AmapMcpConfig::new("amap-test-key")
            .with_endpoint(format!("http://{}/mcp", addr))
            .with_timeout(Duration::from_secs(5)),
    )
    .unwrap();

    let tools = ToolRegistry::new(
        Arc::new(mcp),
        RegistryConfig::default().with_timeout(Duration::from_secs(5)),
    );

    TravelAssistant::new(
        Arc::new(gemini),
        Arc::new(tools),
        AssistantConfig::default(),
    )
}

// ============================================================================
// End-to-end flows
// ============================================================================

#[tokio::test]
async fn test_rental_analysis_over_http() {
    let recorder = Shared::default();
    let assistant = live_assistant(recorder.clone()).await;

    let report = assistant
        .analyze(AnalyzeRequest::new(RENTAL_QUERY), &CancellationToken::new())
        .await;

    assert!(report.success, "unexpected failure: {:?}", report.error);
    assert_eq!(report.scenario, Scenario::RentalHousing);
    assert_eq!(report.response, REPORT);
    assert_eq!(report.tools_used, vec!["maps_geo".to_string()]);
    assert!(report.metadata.data_sources.contains(&"amap".to_string()));
    assert!(report.metadata.data_sources.contains(&"gemini".to_string()));

    let recorder = recorder.lock().unwrap();
    assert!(recorder.gemini_models.iter().all(|m| m == "gemini-test"));
    assert_eq!(recorder.mcp_methods.first().map(String::as_str), Some("initialize"));
    assert_eq!(recorder.tool_calls.len(), 1);
    assert_eq!(recorder.tool_calls[0]["name"], "maps_geo");
    assert_eq!(recorder.tool_calls[0]["arguments"]["address"], "北京市海淀区");
}

#[tokio::test]
async fn test_chat_conversation_over_http() {
    let recorder = Shared::default();
    let assistant = live_assistant(recorder).await;
    let cancel = CancellationToken::new();

    let greeting = assistant.chat("你好", None, &cancel).await.unwrap();
    assert!(greeting.success);
    assert_eq!(greeting.message_type, MessageType::SimpleQa);
    assert!(greeting.response.contains("出行助手"));

    let id = greeting.conversation_id.to_string();
    let analysis = assistant
        .chat(RENTAL_QUERY, Some(&id), &cancel)
        .await
        .unwrap();
    assert!(analysis.success);
    assert_eq!(analysis.message_type, MessageType::Analysis);
    assert_eq!(analysis.conversation_id, greeting.conversation_id);

    let snapshot = assistant
        .store()
        .snapshot_state(greeting.conversation_id)
        .await
        .unwrap();
    assert_eq!(snapshot.turn_count, 4);
    assert!(snapshot.last_state.is_some());
}

#[tokio::test]
async fn test_health_over_http() {
    let recorder = Shared::default();
    let assistant = live_assistant(recorder).await;

    let report = assistant.health().await;

    assert_eq!(report.status, HealthStatus::Healthy);
    assert_eq!(report.components["llm"].provider, "gemini");
    assert_eq!(report.components["mcp"].tools_count, Some(2));

    let remote = assistant.remote_tools().await.unwrap();
    assert_eq!(remote.len(), 2);
}

#[tokio::test]
async fn test_unreachable_map_service_degrades() {
    let recorder = Shared::default();
    let addr = spawn_upstreams(recorder).await;

    let gemini = GeminiProvider::new(
        GeminiConfig::new("gemini-test-key").with_base_url(format!("http://{}/v1beta", addr)),
    )
    .unwrap();
    let mcp = AmapMcpClient::new(
        AmapMcpConfig::new("wrong-key").with_endpoint(format!("http://{}/mcp", addr)),
    )
    .unwrap();
    let assistant = TravelAssistant::new(
        Arc::new(gemini),
        Arc::new(ToolRegistry::with_defaults(Arc::new(mcp))),
        AssistantConfig::default(),
    );

    let report = assistant.health().await;
    assert_eq!(report.status, HealthStatus::Degraded);
    assert!(report.components["mcp"].error.is_some());
    assert!(!report.components["mcp"]
        .error
        .as_deref()
        .unwrap_or_default()
        .contains("wrong-key"));
}
