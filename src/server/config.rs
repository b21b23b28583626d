//! Server configuration types
//!
//! Mirrors `config/default.toml`. Every section has serde defaults so a
//! partial override file or a handful of environment variables is enough.

use secrecy::SecretString;
use serde::{Deserialize, Deserializer};
use std::time::Duration;
use wayfarer_core::{AssistantConfig, OrchestratorConfig, StoreConfig};
use wayfarer_tools::mcp::DEFAULT_ENDPOINT;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub amap: AmapConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorAppConfig,
    #[serde(default)]
    pub conversation: ConversationConfig,
    #[serde(default)]
    pub health: HealthConfig,
}

impl AppConfig {
    /// Service settings for `TravelAssistant`
    pub fn assistant_config(&self) -> AssistantConfig {
        let orchestrator = OrchestratorConfig::new()
            .with_max_iterations(self.orchestrator.max_iterations)
            .with_llm_timeout(Duration::from_secs(self.orchestrator.llm_timeout_secs));

        let store = StoreConfig {
            ttl: Duration::from_secs(self.conversation.ttl_secs),
            max_sessions: self.conversation.max_sessions,
            context_window: self.conversation.context_window,
        };

        let mut config = AssistantConfig::default()
            .with_version(env!("CARGO_PKG_VERSION"))
            .with_orchestrator(orchestrator)
            .with_store(store);
        config.health_timeout = Duration::from_secs(self.health.probe_timeout_secs);
        config
    }
}

fn optional_secret<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<SecretString>, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?
        .filter(|v| !v.trim().is_empty())
        .map(SecretString::from))
}

/// HTTP listener
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8002
}

/// Gemini settings
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// Falls back to `GOOGLE_API_KEY`
    #[serde(default, deserialize_with = "optional_secret")]
    pub api_key: Option<SecretString>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_llm_base_url(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

fn default_model() -> String {
    wayfarer_llm::gemini::DEFAULT_MODEL.to_string()
}

fn default_llm_base_url() -> String {
    wayfarer_llm::gemini::DEFAULT_BASE_URL.to_string()
}

fn default_llm_timeout() -> u64 {
    60
}

/// Amap MCP settings
#[derive(Debug, Clone, Deserialize)]
pub struct AmapConfig {
    /// Falls back to `AMAP_MCP_KEY`
    #[serde(default, deserialize_with = "optional_secret")]
    pub api_key: Option<SecretString>,
    #[serde(default = "default_mcp_url")]
    pub mcp_url: String,
    #[serde(default = "default_tool_timeout")]
    pub timeout_secs: u64,
}

impl Default for AmapConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            mcp_url: default_mcp_url(),
            timeout_secs: default_tool_timeout(),
        }
    }
}

fn default_mcp_url() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_tool_timeout() -> u64 {
    30
}

/// Loop settings (exposed to TOML)
#[derive(Debug, Clone, Deserialize)]
pub struct OrchestratorAppConfig {
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    #[serde(default = "default_llm_timeout")]
    pub llm_timeout_secs: u64,
}

impl Default for OrchestratorAppConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            llm_timeout_secs: default_llm_timeout(),
        }
    }
}

fn default_max_iterations() -> usize {
    wayfarer_core::orchestrator::DEFAULT_MAX_ITERATIONS
}

/// Conversation store settings
#[derive(Debug, Clone, Deserialize)]
pub struct ConversationConfig {
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
    #[serde(default = "default_context_window")]
    pub context_window: usize,
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_secs: u64,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl(),
            max_sessions: default_max_sessions(),
            context_window: default_context_window(),
            cleanup_interval_secs: default_cleanup_interval(),
        }
    }
}

fn default_ttl() -> u64 {
    7200
}
fn default_max_sessions() -> usize {
    1000
}
fn default_context_window() -> usize {
    5
}
fn default_cleanup_interval() -> u64 {
    300
}

/// Health probe settings
#[derive(Debug, Clone, Deserialize)]
pub struct HealthConfig {
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            probe_timeout_secs: default_probe_timeout(),
        }
    }
}

fn default_probe_timeout() -> u64 {
    10
}
