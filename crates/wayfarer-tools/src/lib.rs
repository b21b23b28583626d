//! Wayfarer Tools - Map tool registry and execution
//!
//! This crate provides the tool system for Wayfarer:
//! - Spec: parameter schemas shown to the LLM and enforced before dispatch
//! - Amap: the closed set of mapping tools with typed argument shapes
//! - Registry: listing and failure-categorizing execution with timeouts
//! - MCP: JSON-RPC client for the Amap MCP endpoint
//! - Mock: in-memory executor for tests

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod amap;
pub mod error;
pub mod mcp;
pub mod mock;
pub mod registry;
pub mod spec;

pub use amap::{
    AroundSearchArgs, GeocodeArgs, MapTool, TextSearchArgs, ToolArgs, TransitRouteArgs,
    WalkingRouteArgs,
};
pub use error::{Error, FailureCategory, Result};
pub use mcp::{AmapMcpClient, AmapMcpConfig, McpTool};
pub use mock::MockExecutor;
pub use registry::{CallStatus, MapToolExecutor, RegistryConfig, ToolCallResult, ToolRegistry};
pub use spec::{ParamSpec, ParamType, ToolSpec};
