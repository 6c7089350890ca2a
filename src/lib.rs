//! promptgraph - schema-grounded natural-language GraphQL compilation and
//! semantic search.
//!
//! Two pipelines share one configuration:
//!
//! - **Compile**: introspect a GraphQL endpoint, render its SDL, and turn a
//!   natural-language prompt into a validated query (optionally with a
//!   phrase-to-fragment explanation).
//! - **Search**: embed a query and a node corpus read from Neo4j, rank by
//!   similarity, and return full records for the top matches.
//!
//! Providers (chat, embeddings, store) are trait objects injected at
//! construction, so every pipeline runs against in-memory doubles in tests.

pub mod config;
pub mod embeddings;
pub mod llm;
pub mod schema;
pub mod search;
pub mod store;
pub mod telemetry;
pub mod types;

pub use config::Config;
pub use embeddings::{CachedEmbedder, EmbeddingProvider, OpenAiEmbedder};
pub use llm::{ChatProvider, ExplainCompiler, FunctionSpec, OpenAiChat, QueryCompiler};
pub use schema::{render_sdl, SchemaClient, SchemaModel};
pub use search::{SemanticSearch, Similarity};
pub use store::{GraphStore, Neo4jStore};
pub use types::{CorpusItem, Error, ExplainedQuery, MappingEntry, RankedResult, Result};
