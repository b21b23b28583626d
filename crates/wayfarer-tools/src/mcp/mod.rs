//! MCP (Model Context Protocol) client for the Amap map service
//!
//! Only the HTTP transport is implemented; the Amap endpoint is the single
//! server the assistant talks to.

mod client;
mod protocol;

pub use client::{AmapMcpClient, AmapMcpConfig, DEFAULT_ENDPOINT};
pub use protocol::{
    McpContent, McpInitResult, McpRequest, McpResponse, McpRpcError, McpTool, McpToolList,
    McpToolResult, PROTOCOL_VERSION,
};
