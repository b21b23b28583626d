//! MCP Protocol Types
//!
//! JSON-RPC 2.0 envelopes for the Amap MCP endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Protocol revision sent during `initialize`
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// JSON-RPC request or notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpRequest {
    /// Always `2.0`
    pub jsonrpc: String,
    /// `initialize`, `tools/list`, `tools/call`, ...
    pub method: String,
    /// Request ID, absent for notifications
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Method parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl McpRequest {
    /// Request expecting a response with the same `id`
    pub fn new(method: impl Into<String>, id: u64) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            method: method.into(),
            id: Some(id),
            params: None,
        }
    }

    /// Fire-and-forget message
    pub fn notification(method: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            method: method.into(),
            id: None,
            params: None,
        }
    }

    /// Attach parameters
    #[must_use]
    pub fn with_params(mut self, params: Value) -> Self {
        self.params = Some(params);
        self
    }
}

/// JSON-RPC reply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpResponse {
    /// Protocol marker
    #[serde(default)]
    pub jsonrpc: String,
    /// Echoed request id
    #[serde(default)]
    pub id: Option<u64>,
    /// Payload of a successful call
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Set when the call failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<McpRpcError>,
}

/// `error` member of a reply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpRpcError {
    /// JSON-RPC code (`-32602`, ...)
    pub code: i32,
    /// Server text
    pub message: String,
    /// Extra server detail
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Tool advertised by the server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpTool {
    /// Remote tool name (`maps_geo`, ...)
    pub name: String,
    /// Human description
    #[serde(default)]
    pub description: String,
    /// JSON Schema of the arguments
    #[serde(default, rename = "inputSchema")]
    pub input_schema: Value,
}

/// `tools/list` result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct McpToolList {
    /// Advertised tools
    #[serde(default)]
    pub tools: Vec<McpTool>,
}

/// `tools/call` result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpToolResult {
    /// Returned items; Amap sends one text item
    #[serde(default)]
    pub content: Vec<McpContent>,
    /// Set when the upstream call failed
    #[serde(default, rename = "isError")]
    pub is_error: bool,
}

/// Content item of a tool result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum McpContent {
    /// Text content; Amap puts a JSON document here
    Text {
        /// Raw text
        text: String,
    },
    /// Any other content kind
    #[serde(other)]
    Other,
}

impl McpContent {
    /// Text of the item, if any
    pub fn as_text(&self) -> Option<&str> {
        match self {
            McpContent::Text { text } => Some(text),
            McpContent::Other => None,
        }
    }
}

/// Server information from `initialize`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerInfo {
    /// Implementation name
    #[serde(default)]
    pub name: String,
    /// Implementation version
    #[serde(default)]
    pub version: Option<String>,
}

/// `initialize` result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpInitResult {
    /// Revision accepted by the server
    #[serde(default, rename = "protocolVersion")]
    pub protocol_version: String,
    /// Who answered
    #[serde(default, rename = "serverInfo")]
    pub server_info: Option<ServerInfo>,
}
