//! Production configuration validation

use super::config::AppConfig;
use super::loader::current_env;
use tracing::warn;

/// Warn about risky settings when `WAYFARER_ENV=production`
pub fn validate_production_config(config: &AppConfig) {
    if !current_env().eq_ignore_ascii_case("production") {
        return;
    }

    for warning in production_warnings(config) {
        warn!("SECURITY WARNING: {}", warning);
    }
}

/// Collect production warnings without logging them
pub fn production_warnings(config: &AppConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.server.host == "0.0.0.0" {
        warnings.push(
            "Server is binding to all interfaces (0.0.0.0). \
             Consider binding to 127.0.0.1 behind a reverse proxy."
                .to_string(),
        );
    }

    if config.llm.api_key.is_some() || config.amap.api_key.is_some() {
        warnings.push(
            "API keys are set in configuration files. \
             Prefer GOOGLE_API_KEY / AMAP_MCP_KEY environment variables."
                .to_string(),
        );
    }

    if !config.amap.mcp_url.starts_with("https://") {
        warnings.push(format!(
            "Amap MCP endpoint {} is not HTTPS; the key is sent in the query string.",
            config.amap.mcp_url
        ));
    }

    if config.orchestrator.max_iterations > 12 {
        warnings.push(format!(
            "orchestrator.max_iterations = {} allows long, costly turns.",
            config.orchestrator.max_iterations
        ));
    }

    warnings
}
