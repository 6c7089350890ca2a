//! Embedding providers and the content-hash cache.

pub mod cache;
pub mod openai;
pub mod provider;

pub use cache::CachedEmbedder;
pub use openai::OpenAiEmbedder;
pub use provider::EmbeddingProvider;
