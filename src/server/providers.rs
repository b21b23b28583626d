//! Provider resolution
//!
//! Builds the Gemini provider and the Amap MCP client from configuration,
//! falling back to `GOOGLE_API_KEY` / `AMAP_MCP_KEY`. A missing credential
//! is fatal at startup.

use super::config::{AmapConfig, LlmConfig};
use anyhow::{bail, Context, Result};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use wayfarer_llm::{GeminiConfig, GeminiProvider, LlmProvider};
use wayfarer_tools::{AmapMcpClient, AmapMcpConfig, MapToolExecutor, RegistryConfig, ToolRegistry};

/// Environment variable holding the LLM credential
pub const LLM_KEY_VAR: &str = "GOOGLE_API_KEY";

/// Environment variable holding the mapping credential
pub const AMAP_KEY_VAR: &str = "AMAP_MCP_KEY";

/// Pick the configured secret, else the environment value.
pub fn resolve_key(
    configured: Option<&SecretString>,
    env_value: Option<String>,
    var: &str,
) -> Result<SecretString> {
    if let Some(key) = configured.filter(|k| !k.expose_secret().trim().is_empty()) {
        return Ok(key.clone());
    }

    match env_value.filter(|v| !v.trim().is_empty()) {
        Some(value) => Ok(SecretString::from(value)),
        None => bail!("{} is not set. Add it to .env or the environment.", var),
    }
}

/// Build the Gemini provider
pub fn resolve_llm_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>> {
    let env_key = std::env::var(LLM_KEY_VAR).ok();
    let key = resolve_key(config.api_key.as_ref(), env_key, LLM_KEY_VAR)?;

    let gemini = GeminiConfig::new(key.expose_secret())
        .with_model(&config.model)
        .with_base_url(&config.base_url)
        .with_timeout(Duration::from_secs(config.timeout_secs));

    let provider = GeminiProvider::new(gemini).context("Failed to create Gemini provider")?;
    info!(model = %config.model, "Registered Gemini provider");

    Ok(Arc::new(provider))
}

/// Build the tool registry over the Amap MCP endpoint
pub fn resolve_tool_registry(config: &AmapConfig) -> Result<Arc<ToolRegistry>> {
    let env_key = std::env::var(AMAP_KEY_VAR).ok();
    let key = resolve_key(config.api_key.as_ref(), env_key, AMAP_KEY_VAR)?;
    let timeout = Duration::from_secs(config.timeout_secs);

    let client = AmapMcpClient::new(
        AmapMcpConfig::new(key.expose_secret())
            .with_endpoint(&config.mcp_url)
            .with_timeout(timeout),
    )
    .context("Failed to create Amap MCP client")?;
    info!(endpoint = %client.endpoint(), "Registered Amap MCP client");

    let executor: Arc<dyn MapToolExecutor> = Arc::new(client);
    Ok(Arc::new(ToolRegistry::new(
        executor,
        RegistryConfig::default().with_timeout(timeout),
    )))
}
