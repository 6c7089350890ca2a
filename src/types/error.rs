//! Error types for promptgraph operations.
//!
//! Uses `thiserror` for ergonomic error definitions with automatic `From` implementations.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type covering every external boundary of the crate.
///
/// Propagation is uniform: every boundary call returns `Result`. Degrading to
/// an empty result is a caller-side choice (see `SemanticSearch::search`),
/// never something a component decides silently.
#[derive(Error, Debug)]
pub enum Error {
    /// Schema introspection failed (endpoint unreachable or response unparseable)
    #[error("Schema introspection failed: {0}")]
    Introspection(String),

    /// Generated model output violated its contract (free-text output invalid
    /// after sanitization and bounded retries, or structured output malformed)
    #[error("Model contract violation: {0}")]
    ModelContract(String),

    /// The provider ignored the forced function call and returned no arguments
    #[error("structured explanation missing from model response")]
    ExplanationMissing,

    /// Backing store unreachable or query failure
    #[error("Store error: {0}")]
    Store(String),

    /// Embedding generation failed
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = Error::Introspection("connection refused".to_string());
        assert_eq!(err.to_string(), "Schema introspection failed: connection refused");

        let err = Error::ExplanationMissing;
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_json_error_conversion() {
        let parse_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: Error = parse_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
