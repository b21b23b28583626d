//! Error types for wayfarer-core
//!
//! Most failures inside a turn are absorbed (degraded classification,
//! failed tool calls, unparseable decisions). The variants here are the
//! ones that reach a caller.

use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// Unknown or expired conversation id
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// The final report could not be generated
    #[error("synthesis failed: {0}")]
    Synthesis(String),

    /// An LLM call exceeded its deadline
    #[error("llm timed out after {0}ms")]
    LlmTimeout(u64),

    /// The caller cancelled the turn
    #[error("turn cancelled")]
    Cancelled,

    /// Invalid or missing settings
    #[error("configuration error: {0}")]
    Configuration(String),

    /// LLM provider error
    #[error("llm error: {0}")]
    Llm(#[from] wayfarer_llm::Error),

    /// Tool error
    #[error("tool error: {0}")]
    Tool(#[from] wayfarer_tools::Error),
}

impl Error {
    /// Stable machine-readable code for API responses
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Error::SessionNotFound(_) => "session_not_found",
            Error::Synthesis(_) => "synthesis_failed",
            Error::LlmTimeout(_) => "llm_timeout",
            Error::Cancelled => "cancelled",
            Error::Configuration(_) => "configuration_error",
            Error::Llm(_) => "llm_error",
            Error::Tool(_) => "tool_error",
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// User-facing rendering of an error
pub trait UserFriendlyError {
    /// Message safe to show to an end user
    fn user_message(&self) -> String;

    /// What the user can do about it
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for Error {
    fn user_message(&self) -> String {
        match self {
            Error::SessionNotFound(id) => format!("会话 {} 不存在或已过期。", id),
            Error::Synthesis(_) => "分析报告生成失败，请稍后重试。".to_string(),
            Error::LlmTimeout(_) => "智能分析服务响应超时，请稍后重试。".to_string(),
            Error::Cancelled => "请求已取消。".to_string(),
            Error::Configuration(msg) => format!("服务配置错误: {}", msg),
            Error::Llm(_) => "智能分析服务暂时不可用，请稍后重试。".to_string(),
            Error::Tool(_) => "地图服务暂时不可用，请稍后重试。".to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            Error::SessionNotFound(_) => {
                Some("不带 conversation_id 重新发送消息即可开始新的会话。".to_string())
            }
            Error::LlmTimeout(_) | Error::Llm(_) => {
                Some("检查网络连接或 GOOGLE_API_KEY 配置。".to_string())
            }
            Error::Tool(_) => Some("检查 AMAP_MCP_KEY 配置和高德服务配额。".to_string()),
            Error::Configuration(_) => Some("运行 `wayfarer doctor` 检查配置。".to_string()),
            Error::Synthesis(_) | Error::Cancelled => None,
        }
    }
}
