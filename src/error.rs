//! Privacy guard error types

use thiserror::Error;

/// Privacy guard error type
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Lexicon compilation error
    #[error("Lexicon error: {0}")]
    Lexicon(String),

    /// Payload references one of its own ancestors
    #[error("Payload contains a cyclic reference at depth {depth}")]
    CyclicPayload { depth: usize },

    /// Payload nesting exceeds the traversal limit
    #[error("Payload nesting exceeds the maximum depth of {0}")]
    DepthLimitExceeded(usize),

    /// Audit sink error
    #[error("Audit error: {0}")]
    Audit(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML config parse error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type alias for privacy guard operations
pub type Result<T> = std::result::Result<T, Error>;

/// Serialize a value for an HTTP response body, falling back to `null`.
pub fn to_json<T: serde::Serialize>(value: T) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or(serde_json::Value::Null)
}
