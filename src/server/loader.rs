//! Configuration loading
//!
//! Layers embedded defaults, optional files and `WAYFARER_` environment
//! variables into an [`AppConfig`].

use super::config::AppConfig;
use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};

/// Embedded default configuration (compiled into binary)
pub const DEFAULT_CONFIG: &str = include_str!("../../config/default.toml");

/// Active deployment environment (`WAYFARER_ENV`, default `development`)
pub fn current_env() -> String {
    std::env::var("WAYFARER_ENV").unwrap_or_else(|_| "development".to_string())
}

/// Load configuration from files and environment
pub fn load_config() -> Result<AppConfig> {
    let env_file = format!("config/{}", current_env());
    let config = Config::builder()
        .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&env_file).required(false))
        .add_source(File::with_name("config/local").required(false))
        // WAYFARER_LLM__MODEL -> llm.model
        .add_source(
            Environment::with_prefix("WAYFARER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    config
        .try_deserialize()
        .context("Failed to deserialize configuration")
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn from_toml(extra: &str) -> AppConfig {
        Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from_str(extra, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_embedded_defaults() {
        let config = from_toml("");
        assert_eq!(config.server.port, 8002);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.orchestrator.max_iterations, 8);
        assert_eq!(config.conversation.ttl_secs, 7200);
        assert_eq!(config.conversation.max_sessions, 1000);
        assert_eq!(config.conversation.context_window, 5);
        assert_eq!(config.health.probe_timeout_secs, 10);
        assert_eq!(config.amap.mcp_url, "https://mcp.amap.com/mcp");
        assert!(config.llm.api_key.is_none());
        assert!(config.amap.api_key.is_none());
    }

    #[test]
    fn test_override_layer() {
        let config = from_toml(
            r#"
            [server]
            port = 9100

            [llm]
            api_key = "g-key"
            model = "gemini-1.5-pro"

            [orchestrator]
            max_iterations = 3
            "#,
        );

        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.llm.model, "gemini-1.5-pro");
        let key = config.llm.api_key.as_ref().map(|k| k.expose_secret());
        assert_eq!(key, Some("g-key"));

        let assistant = config.assistant_config();
        assert_eq!(assistant.orchestrator.max_iterations, 3);
        assert_eq!(assistant.store.context_window, 5);
        assert_eq!(assistant.health_timeout.as_secs(), 10);
    }

    #[test]
    fn test_missing_sections_use_serde_defaults() {
        let config: AppConfig = Config::builder()
            .add_source(File::from_str("[server]\nport = 8100", FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 8100);
        assert_eq!(config.llm.timeout_secs, 60);
        assert_eq!(config.amap.timeout_secs, 30);
        assert_eq!(config.conversation.cleanup_interval_secs, 300);
    }
}
