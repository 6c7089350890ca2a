//! Environment-driven configuration for remote service handles.
//!
//! Nothing in the crate reads the environment directly; everything is
//! constructed from an explicit [`Config`] so components can be wired with
//! test doubles or multiple independent configurations.

use crate::types::{Error, Result};
use std::time::Duration;

const DEFAULT_CHAT_MODEL: &str = "o4-mini";
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";
const DEFAULT_GRAPHQL_ENDPOINT: &str = "http://localhost:4000/graphql";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_EMBED_CONCURRENCY: usize = 8;

/// Connection and model configuration for all remote services.
#[derive(Debug, Clone)]
pub struct Config {
    /// OpenAI API key (chat and embeddings)
    pub openai_api_key: String,
    /// Chat model used for query compilation
    pub chat_model: String,
    /// Embedding model used for semantic search
    pub embedding_model: String,
    /// GraphQL endpoint used for schema introspection
    pub graphql_endpoint: String,
    /// Bolt URI of the backing store
    pub neo4j_uri: String,
    /// Store username
    pub neo4j_user: String,
    /// Store password
    pub neo4j_password: String,
    /// Deadline applied to every outbound HTTP request
    pub request_timeout: Duration,
    /// Concurrency bound for embedding fan-out when batching is unavailable
    pub embed_concurrency: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required: `OPENAI_API_KEY`, `NEO4J_URI`, `NEO4J_USER`, `NEO4J_PASSWORD`.
    ///
    /// Optional with defaults: `PROMPTGRAPH_CHAT_MODEL`,
    /// `PROMPTGRAPH_EMBEDDING_MODEL`, `PROMPTGRAPH_GRAPHQL_ENDPOINT`,
    /// `PROMPTGRAPH_TIMEOUT_SECS`, `PROMPTGRAPH_EMBED_CONCURRENCY`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if a required variable is missing or an
    /// optional one fails to parse.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            openai_api_key: require("OPENAI_API_KEY")?,
            chat_model: optional("PROMPTGRAPH_CHAT_MODEL", DEFAULT_CHAT_MODEL),
            embedding_model: optional("PROMPTGRAPH_EMBEDDING_MODEL", DEFAULT_EMBEDDING_MODEL),
            graphql_endpoint: optional("PROMPTGRAPH_GRAPHQL_ENDPOINT", DEFAULT_GRAPHQL_ENDPOINT),
            neo4j_uri: require("NEO4J_URI")?,
            neo4j_user: require("NEO4J_USER")?,
            neo4j_password: require("NEO4J_PASSWORD")?,
            request_timeout: parse_timeout(
                std::env::var("PROMPTGRAPH_TIMEOUT_SECS").ok().as_deref(),
            )?,
            embed_concurrency: parse_concurrency(
                std::env::var("PROMPTGRAPH_EMBED_CONCURRENCY").ok().as_deref(),
            )?,
        })
    }

    /// Build the shared HTTP client with the configured request deadline.
    ///
    /// The client is cheap to clone and safe to share across in-flight
    /// requests.
    ///
    /// # Errors
    ///
    /// Returns `Error::Http` if the client cannot be constructed.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        Ok(reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()?)
    }
}

fn require(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| Error::Config(format!("{} environment variable not set", name)))
}

fn optional(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_timeout(value: Option<&str>) -> Result<Duration> {
    match value {
        None => Ok(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        Some(raw) => raw
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| Error::Config(format!("invalid timeout seconds: {}", raw))),
    }
}

fn parse_concurrency(value: Option<&str>) -> Result<usize> {
    match value {
        None => Ok(DEFAULT_EMBED_CONCURRENCY),
        Some(raw) => match raw.parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(Error::Config(format!("invalid embed concurrency: {}", raw))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_default_and_parse() {
        assert_eq!(parse_timeout(None).unwrap(), Duration::from_secs(30));
        assert_eq!(parse_timeout(Some("5")).unwrap(), Duration::from_secs(5));
        assert!(parse_timeout(Some("soon")).is_err());
    }

    #[test]
    fn test_concurrency_rejects_zero() {
        assert_eq!(parse_concurrency(None).unwrap(), 8);
        assert_eq!(parse_concurrency(Some("2")).unwrap(), 2);
        assert!(parse_concurrency(Some("0")).is_err());
        assert!(parse_concurrency(Some("lots")).is_err());
    }
}
