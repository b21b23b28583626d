//! Error types for wayfarer-llm

use thiserror::Error;

/// LLM error type
#[derive(Debug, Error)]
pub enum Error {
    /// Provider not configured (missing credential, bad base URL)
    #[error("provider not configured: {0}")]
    NotConfigured(String),

    /// API error returned by the provider
    #[error("api error: {0}")]
    Api(String),

    /// Rate limit exceeded
    #[error("rate limit exceeded")]
    RateLimit,

    /// Provider-side 5xx
    #[error("server error: {0}")]
    ServerError(String),

    /// Response could not be decoded
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Network error
    #[error("network error: {0}")]
    Network(String),

    /// Timeout
    #[error("timeout after {0}ms")]
    Timeout(u64),
}

impl Error {
    /// Whether this error is a timeout
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
