//! Embedding provider abstraction.

use crate::types::Result;
use async_trait::async_trait;

/// Embedding provider.
///
/// Providers that cannot batch report `supports_batch() == false`; the
/// search engine then falls back to a bounded-concurrency fan-out over
/// single-text calls.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of texts, preserving input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Vector dimensionality produced by this provider.
    fn dimensions(&self) -> usize;

    /// Whether `embed_batch` is a single provider call rather than a loop.
    fn supports_batch(&self) -> bool {
        true
    }
}
