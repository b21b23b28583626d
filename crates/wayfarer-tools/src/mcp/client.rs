//! Amap MCP Client
//!
//! Speaks JSON-RPC over HTTP POST to `https://mcp.amap.com/mcp?key=...`.
//! The server may answer with plain JSON or a short SSE stream; both are
//! accepted. `initialize` runs lazily before the first real request and again
//! when the server answers 404 to a stale `Mcp-Session-Id`.

use super::protocol::{
    McpInitResult, McpRequest, McpResponse, McpTool, McpToolList, McpToolResult,
    PROTOCOL_VERSION,
};
use crate::amap::ToolArgs;
use crate::error::{Error, Result};
use crate::registry::MapToolExecutor;
use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// Public Amap MCP endpoint
pub const DEFAULT_ENDPOINT: &str = "https://mcp.amap.com/mcp";

const SESSION_HEADER: &str = "mcp-session-id";

/// Amap MCP client configuration
#[derive(Clone)]
pub struct AmapMcpConfig {
    /// Endpoint URL without the key query
    pub endpoint: String,
    /// Amap key, sent as `?key=`
    pub api_key: SecretString,
    /// Transport-level deadline for one HTTP exchange
    pub request_timeout: Duration,
}

impl std::fmt::Debug for AmapMcpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AmapMcpConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"[REDACTED]")
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl AmapMcpConfig {
    /// Create with an API key and default endpoint
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: SecretString::from(api_key.into()),
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Create from `AMAP_MCP_KEY`
    pub fn from_env() -> Result<Self> {
        let key = std::env::var("AMAP_MCP_KEY")
            .map_err(|_| Error::NotConfigured("AMAP_MCP_KEY not set".to_string()))?;
        Ok(Self::new(key))
    }

    /// Override the endpoint
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Override the HTTP timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// JSON-RPC client for the Amap MCP server
pub struct AmapMcpClient {
    client: reqwest::Client,
    config: AmapMcpConfig,
    request_id: AtomicU64,
    initialized: Mutex<Option<McpInitResult>>,
    session_id: RwLock<Option<String>>,
}

/// Outcome of one HTTP exchange
enum Exchange {
    Body(String),
    /// The server no longer knows the session id that was sent
    SessionLost(String),
}

impl AmapMcpClient {
    /// Create a new client
    pub fn new(config: AmapMcpConfig) -> Result<Self> {
        if config.api_key.expose_secret().trim().is_empty() {
            return Err(Error::NotConfigured("Amap MCP key is empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| Error::Upstream(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config,
            request_id: AtomicU64::new(1),
            initialized: Mutex::new(None),
            session_id: RwLock::new(None),
        })
    }

    /// Create from environment
    pub fn from_env() -> Result<Self> {
        Self::new(AmapMcpConfig::from_env()?)
    }

    /// Endpoint in use
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Run `initialize` unless a live session already exists
    pub async fn ensure_initialized(&self) -> Result<McpInitResult> {
        let mut initialized = self.initialized.lock().await;
        if let Some(init) = initialized.as_ref() {
            return Ok(init.clone());
        }

        let request = McpRequest::new("initialize", self.next_id()).with_params(json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": { "tools": {} },
            "clientInfo": {
                "name": "wayfarer",
                "version": env!("CARGO_PKG_VERSION")
            }
        }));
        let body = match self.exchange(&request).await? {
            Exchange::Body(body) => body,
            Exchange::SessionLost(_) => {
                return Err(Error::Upstream("initialize rejected".to_string()));
            }
        };
        let init: McpInitResult = decode_rpc(&request.method, &body)?;
        info!(
            endpoint = %self.config.endpoint,
            protocol = %init.protocol_version,
            "MCP session initialized"
        );

        let notification = McpRequest::notification("notifications/initialized");
        if let Err(e) = self.exchange(&notification).await {
            debug!(error = %e, "initialized notification not accepted");
        }

        *initialized = Some(init.clone());
        Ok(init)
    }

    /// `tools/list`
    #[instrument(skip(self))]
    pub async fn list_tools(&self) -> Result<Vec<McpTool>> {
        let request = McpRequest::new("tools/list", self.next_id()).with_params(json!({}));
        let list: McpToolList = self.request(request).await?;
        Ok(list.tools)
    }

    /// `tools/call`, returning the decoded first text content
    #[instrument(skip(self, arguments))]
    pub async fn call(&self, name: &str, arguments: Value) -> Result<Value> {
        let request = McpRequest::new("tools/call", self.next_id()).with_params(json!({
            "name": name,
            "arguments": arguments,
        }));
        let result: McpToolResult = self.request(request).await?;
        decode_tool_result(result)
    }

    /// Send within a session; an expired session is re-established once
    async fn request<T: DeserializeOwned>(&self, request: McpRequest) -> Result<T> {
        self.ensure_initialized().await?;

        let body = match self.exchange(&request).await? {
            Exchange::Body(body) => body,
            Exchange::SessionLost(stale) => {
                info!(method = %request.method, "MCP session expired, re-initializing");
                self.forget_session(&stale).await;
                self.ensure_initialized().await?;
                match self.exchange(&request).await? {
                    Exchange::Body(body) => body,
                    Exchange::SessionLost(_) => {
                        return Err(Error::Upstream(format!(
                            "{} rejected: session not found",
                            request.method
                        )));
                    }
                }
            }
        };

        decode_rpc(&request.method, &body)
    }

    async fn exchange(&self, request: &McpRequest) -> Result<Exchange> {
        let mut builder = self
            .client
            .post(&self.config.endpoint)
            .query(&[("key", self.config.api_key.expose_secret())])
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json, text/event-stream")
            .json(request);

        let sent_session = self.session();
        if let Some(session) = &sent_session {
            builder = builder.header(SESSION_HEADER, session);
        }

        let response = builder.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            if let Some(stale) = sent_session {
                return Ok(Exchange::SessionLost(stale));
            }
        }

        if let Some(session) = response.headers().get(SESSION_HEADER) {
            self.remember_session(session);
        }

        let text = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            warn!(method = %request.method, status = %status, "MCP request rejected");
            return Err(Error::Upstream(format!(
                "HTTP {}: {}",
                status,
                self.redact(&text)
            )));
        }
        Ok(Exchange::Body(text))
    }

    fn session(&self) -> Option<String> {
        self.session_id.read().ok().and_then(|s| s.clone())
    }

    fn remember_session(&self, value: &HeaderValue) {
        if let (Ok(value), Ok(mut slot)) = (value.to_str(), self.session_id.write()) {
            if slot.as_deref() != Some(value) {
                *slot = Some(value.to_string());
            }
        }
    }

    /// Drop `stale` unless another request already replaced it
    async fn forget_session(&self, stale: &str) {
        let mut initialized = self.initialized.lock().await;
        let Ok(mut slot) = self.session_id.write() else {
            return;
        };
        if slot.as_deref() == Some(stale) {
            *slot = None;
            *initialized = None;
        }
    }

    fn transport_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::Timeout(self.config.request_timeout.as_millis() as u64)
        } else {
            Error::Upstream(self.redact(&e.to_string()))
        }
    }

    fn redact(&self, text: &str) -> String {
        let key = self.config.api_key.expose_secret();
        if key.is_empty() {
            text.to_string()
        } else {
            text.replace(key, "[REDACTED]")
        }
    }
}

#[async_trait::async_trait]
impl MapToolExecutor for AmapMcpClient {
    fn name(&self) -> &str {
        "amap-mcp"
    }

    async fn call_tool(&self, args: &ToolArgs) -> Result<Value> {
        self.call(args.tool().name(), args.to_arguments()).await
    }

    async fn list_remote_tools(&self) -> Result<Vec<McpTool>> {
        self.list_tools().await
    }
}

/// Parse a JSON body or the first `data:` event of an SSE body
fn parse_response(body: &str) -> Result<McpResponse> {
    let trimmed = body.trim();
    if trimmed.starts_with('{') {
        return serde_json::from_str(trimmed)
            .map_err(|e| Error::InvalidResponse(format!("invalid JSON-RPC body: {}", e)));
    }

    trimmed
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(str::trim)
        .filter(|data| !data.is_empty())
        .find_map(|data| serde_json::from_str::<McpResponse>(data).ok())
        .ok_or_else(|| Error::InvalidResponse("no JSON-RPC message in response".to_string()))
}

fn decode_rpc<T: DeserializeOwned>(method: &str, body: &str) -> Result<T> {
    let response = parse_response(body)?;

    if let Some(err) = response.error {
        return Err(Error::Upstream(format!(
            "{} failed ({}): {}",
            method, err.code, err.message
        )));
    }
    let result = response
        .result
        .ok_or_else(|| Error::InvalidResponse(format!("{} returned no result", method)))?;

    serde_json::from_value(result)
        .map_err(|e| Error::InvalidResponse(format!("malformed {} result: {}", method, e)))
}

/// Amap returns its data as a JSON document inside the first text item
fn decode_tool_result(result: McpToolResult) -> Result<Value> {
    let text = result.content.iter().find_map(|c| c.as_text());

    if result.is_error {
        return Err(Error::Upstream(
            text.unwrap_or("tool reported an error").to_string(),
        ));
    }

    let Some(text) = text else {
        return Err(Error::InvalidResponse(
            "tool result has no text content".to_string(),
        ));
    };

    match serde_json::from_str(text) {
        Ok(value) => Ok(value),
        Err(_) => Ok(Value::String(text.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::McpContent;

    #[test]
    fn test_parse_plain_json() {
        let response =
            parse_response(r#"{"jsonrpc":"2.0","id":1,"result":{"tools":[]}}"#).unwrap();
        assert_eq!(response.id, Some(1));
        assert!(response.result.is_some());
    }

    #[test]
    fn test_parse_sse_body() {
        let body = "event: message\ndata: {\"jsonrpc\":\"2.0\",\"id\":2,\"result\":{}}\n\n";
        let response = parse_response(body).unwrap();
        assert_eq!(response.id, Some(2));
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(
            parse_response("<html>bad gateway</html>"),
            Err(Error::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_decode_json_text() {
        let result = McpToolResult {
            content: vec![McpContent::Text {
                text: r#"{"results":[{"location":"116.48,39.99"}]}"#.to_string(),
            }],
            is_error: false,
        };
        let value = decode_tool_result(result).unwrap();
        assert_eq!(value["results"][0]["location"], "116.48,39.99");
    }

    #[test]
    fn test_decode_plain_text_kept() {
        let result = McpToolResult {
            content: vec![McpContent::Text {
                text: "no data".to_string(),
            }],
            is_error: false,
        };
        assert_eq!(decode_tool_result(result).unwrap(), Value::from("no data"));
    }

    #[test]
    fn test_decode_error_flag() {
        let result = McpToolResult {
            content: vec![McpContent::Text {
                text: "INVALID_USER_KEY".to_string(),
            }],
            is_error: true,
        };
        assert!(matches!(decode_tool_result(result), Err(Error::Upstream(_))));
    }

    #[test]
    fn test_decode_error_flag_without_text() {
        let result = McpToolResult {
            content: vec![],
            is_error: true,
        };
        assert!(matches!(decode_tool_result(result), Err(Error::Upstream(_))));
    }

    #[test]
    fn test_decode_rpc_error() {
        let body = r#"{"jsonrpc":"2.0","id":3,"error":{"code":-32601,"message":"no such method"}}"#;
        let err = decode_rpc::<McpToolList>("tools/list", body).unwrap_err();
        assert!(matches!(err, Error::Upstream(ref m) if m.contains("-32601")));
    }

    #[test]
    fn test_decode_empty_content() {
        let result = McpToolResult {
            content: vec![],
            is_error: false,
        };
        assert!(matches!(
            decode_tool_result(result),
            Err(Error::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_empty_key_rejected() {
        assert!(matches!(
            AmapMcpClient::new(AmapMcpConfig::new("  ")),
            Err(Error::NotConfigured(_))
        ));
    }

    #[test]
    fn test_config_debug_redacts_key() {
        let config = AmapMcpConfig::new("amap-secret");
        assert!(!format!("{:?}", config).contains("amap-secret"));
    }
}
