//! Error types for wayfarer-tools

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tool error type
#[derive(Debug, Error)]
pub enum Error {
    /// No tool with this name exists in the registry
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// Arguments failed schema or shape validation
    #[error("invalid arguments for {tool}: {reason}")]
    InvalidArguments {
        /// Tool name
        tool: String,
        /// Which field is missing or malformed
        reason: String,
    },

    /// Upstream call exceeded its deadline
    #[error("timeout after {0}ms")]
    Timeout(u64),

    /// Transport, HTTP or JSON-RPC level failure
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Upstream answered but the payload could not be decoded
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Executor is missing configuration
    #[error("not configured: {0}")]
    NotConfigured(String),
}

impl Error {
    /// Shorthand for an argument validation failure
    pub fn invalid(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            tool: tool.into(),
            reason: reason.into(),
        }
    }

    /// Failure category reported in a `ToolCallResult`
    #[must_use]
    pub fn category(&self) -> FailureCategory {
        match self {
            Self::UnknownTool(_) => FailureCategory::UnknownTool,
            Self::InvalidArguments { .. } => FailureCategory::InvalidArguments,
            Self::Timeout(_) => FailureCategory::Timeout,
            Self::Upstream(_) | Self::NotConfigured(_) => FailureCategory::UpstreamError,
            Self::InvalidResponse(_) => FailureCategory::InvalidResponse,
        }
    }
}

/// Category of a failed tool call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    /// Schema violation, executor never called
    InvalidArguments,
    /// Name not in the registry
    UnknownTool,
    /// Upstream deadline exceeded
    Timeout,
    /// Upstream transport or server failure
    UpstreamError,
    /// Upstream payload undecodable
    InvalidResponse,
}

impl FailureCategory {
    /// Returns the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidArguments => "invalid_arguments",
            Self::UnknownTool => "unknown_tool",
            Self::Timeout => "timeout",
            Self::UpstreamError => "upstream_error",
            Self::InvalidResponse => "invalid_response",
        }
    }
}

impl std::fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert_eq!(Error::Timeout(100).category(), FailureCategory::Timeout);
        assert_eq!(
            Error::invalid("maps_geo", "missing field `address`").category(),
            FailureCategory::InvalidArguments
        );
        assert_eq!(
            Error::UnknownTool("maps_weather".into()).category(),
            FailureCategory::UnknownTool
        );
        assert_eq!(
            Error::Upstream("HTTP 502".into()).category().to_string(),
            "upstream_error"
        );
    }
}
