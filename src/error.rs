//! Error types for Jarvis
//!
//! This module defines all error types used throughout the service,
//! using `thiserror` for ergonomic error handling. Callers that need to
//! classify a failure (the HTTP layer, the orchestrator) downcast the
//! `anyhow::Error` back to [`JarvisError`].

use thiserror::Error;

/// Main error type for Jarvis operations
///
/// This enum encompasses every failure the request pipeline can report:
/// configuration and startup problems, provider and search failures,
/// caller input errors, and storage errors.
#[derive(Error, Debug)]
pub enum JarvisError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Provider-related errors (API calls, malformed responses, etc.)
    #[error("Provider error: {0}")]
    Provider(String),

    /// The provider reported a quota or rate-limit condition
    #[error("Rate limited by provider: {0}")]
    RateLimited(String),

    /// Every credential in the pool failed for one request
    #[error("All {attempts} provider credentials failed (rate limited: {rate_limited}): {last_error}")]
    CapacityExceeded {
        /// Number of credentials attempted
        attempts: usize,
        /// Whether any of the attempts failed with a rate-limit signal
        rate_limited: bool,
        /// Message of the last provider failure
        last_error: String,
    },

    /// Session identifier is unsafe to use as a storage key
    #[error("Invalid session_id: {0}")]
    InvalidSessionId(String),

    /// Message text is outside the accepted length bounds
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    /// Missing credentials for provider
    #[error("Missing credentials for provider: {0}")]
    MissingCredentials(String),

    /// Web search errors
    #[error("Search error: {0}")]
    Search(String),

    /// Vector index / embedding errors
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// Session storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl JarvisError {
    /// Returns true when this error is a caller input error
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            JarvisError::InvalidSessionId(_) | JarvisError::InvalidMessage(_)
        )
    }

    /// Returns true when this error carries a rate-limit signal
    pub fn is_rate_limited(&self) -> bool {
        match self {
            JarvisError::RateLimited(_) => true,
            JarvisError::CapacityExceeded { rate_limited, .. } => *rate_limited,
            _ => false,
        }
    }
}

/// Returns true if an `anyhow` error chain contains a rate-limit signal
///
/// Provider errors are matched structurally first. Errors that arrive as
/// plain text (for example from a proxy) are recognised by a standalone
/// `429` status code or the usual quota phrases. Digits inside longer tokens,
/// such as request ids, do not count.
pub fn is_rate_limit_error(err: &anyhow::Error) -> bool {
    if let Some(jarvis_err) = err.downcast_ref::<JarvisError>() {
        if jarvis_err.is_rate_limited() {
            return true;
        }
    }
    let text = err.to_string().to_lowercase();
    let has_status = text
        .split(|c: char| !c.is_ascii_alphanumeric())
        .any(|token| token == "429");
    has_status || text.contains("rate limit") || text.contains("tokens per day")
}

/// Result type alias for Jarvis operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
