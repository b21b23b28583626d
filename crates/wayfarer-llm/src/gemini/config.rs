//! Gemini provider configuration

use crate::error::{Error, Result};
use secrecy::SecretString;
use std::time::Duration;

/// Public Gemini REST endpoint
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";

/// Models offered to callers
pub(crate) const MODELS: &[&str] = &[
    "gemini-2.0-flash-exp",
    "gemini-2.0-flash",
    "gemini-1.5-flash",
];

/// Gemini provider configuration
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key (`GOOGLE_API_KEY`)
    pub api_key: SecretString,
    /// Base URL
    pub base_url: String,
    /// Model used when a request leaves `model` empty
    pub default_model: String,
    /// Default max output tokens
    pub default_max_tokens: u32,
    /// HTTP request timeout
    pub timeout: Duration,
}

impl GeminiConfig {
    /// Create a configuration with defaults
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            base_url: DEFAULT_BASE_URL.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            default_max_tokens: 4096,
            timeout: Duration::from_secs(60),
        }
    }

    /// Read `GOOGLE_API_KEY` (or `GEMINI_API_KEY`) from the environment
    pub fn from_env() -> Result<Self> {
        let key = std::env::var("GOOGLE_API_KEY")
            .or_else(|_| std::env::var("GEMINI_API_KEY"))
            .map_err(|_| Error::NotConfigured("GOOGLE_API_KEY not set".to_string()))?;
        if key.trim().is_empty() {
            return Err(Error::NotConfigured("GOOGLE_API_KEY is empty".to_string()));
        }
        Ok(Self::new(key))
    }

    /// Set the default model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the HTTP timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the default max output tokens
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.default_max_tokens = max_tokens;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_config_builder() {
        let config = GeminiConfig::new("test-key")
            .with_model("gemini-2.0-flash")
            .with_base_url("http://localhost:9000/")
            .with_timeout(Duration::from_secs(5));

        assert_eq!(config.api_key.expose_secret(), "test-key");
        assert_eq!(config.default_model, "gemini-2.0-flash");
        assert_eq!(config.base_url, "http://localhost:9000");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = GeminiConfig::new("super-secret");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
    }
}
