//! Semantic retrieval over labeled graph nodes.
//!
//! The engine reads the corpus from the store, embeds the query and every
//! text, scores with the configured similarity strategy, and re-fetches full
//! records for the top-K ids in rank order. `search` is the fail-soft outer
//! surface; `try_search` and `rank` propagate errors for callers that need
//! them.

pub mod similarity;

pub use similarity::Similarity;

use crate::embeddings::EmbeddingProvider;
use crate::store::GraphStore;
use crate::types::{Error, RankedResult, Result};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

const DEFAULT_LABEL: &str = "Movie";
const DEFAULT_TEXT_PROPERTY: &str = "synopsis";
const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Semantic search engine over one node label.
pub struct SemanticSearch {
    store: Arc<dyn GraphStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    label: String,
    text_property: String,
    similarity: Similarity,
    max_concurrency: usize,
}

impl SemanticSearch {
    /// Create an engine with the default label (`Movie`), text property
    /// (`synopsis`), and similarity strategy (dot product).
    pub fn new(store: Arc<dyn GraphStore>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            store,
            embedder,
            label: DEFAULT_LABEL.to_string(),
            text_property: DEFAULT_TEXT_PROPERTY.to_string(),
            similarity: Similarity::default(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    /// Set the node label to search.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the text property embedded for each node.
    pub fn with_text_property(mut self, property: impl Into<String>) -> Self {
        self.text_property = property.into();
        self
    }

    /// Set the similarity strategy.
    pub fn with_similarity(mut self, similarity: Similarity) -> Self {
        self.similarity = similarity;
        self
    }

    /// Set the fan-out concurrency bound for non-batching providers
    /// (minimum 1).
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// Search and return full records in rank order, degrading to an empty
    /// list on any failure.
    ///
    /// This is the fail-soft surface intended for request handlers: the
    /// error is logged, never surfaced. Use [`try_search`](Self::try_search)
    /// to observe failures.
    pub async fn search(&self, query: &str, top_k: usize) -> Vec<serde_json::Value> {
        match self.try_search(query, top_k).await {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, label = %self.label, "search degraded to empty result");
                Vec::new()
            }
        }
    }

    /// Search and return full records in rank order.
    ///
    /// # Errors
    ///
    /// Propagates store and embedding failures.
    pub async fn try_search(&self, query: &str, top_k: usize) -> Result<Vec<serde_json::Value>> {
        let ranked = self.rank(query, top_k).await?;
        if ranked.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = ranked.iter().map(|r| r.id.clone()).collect();
        let records = self.store.fetch_by_ids(&self.label, &ids).await?;
        Ok(order_by_rank(records, &ids))
    }

    /// Rank the corpus against a query, returning at most `top_k` results
    /// with non-increasing scores.
    ///
    /// Ties keep corpus order; the sort is stable.
    ///
    /// # Errors
    ///
    /// Propagates store and embedding failures.
    pub async fn rank(&self, query: &str, top_k: usize) -> Result<Vec<RankedResult>> {
        let corpus = self
            .store
            .fetch_corpus(&self.label, &self.text_property)
            .await?;

        if corpus.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let texts: Vec<String> = corpus.iter().map(|item| item.text.clone()).collect();
        let (query_vector, text_vectors) = self.embed_all(query, &texts).await?;

        let mut ranked: Vec<RankedResult> = corpus
            .iter()
            .zip(text_vectors.iter())
            .map(|(item, vector)| RankedResult {
                id: item.id.clone(),
                score: self.similarity.score(&query_vector, vector),
            })
            .collect();

        ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        ranked.truncate(top_k);

        debug!(
            corpus = corpus.len(),
            returned = ranked.len(),
            label = %self.label,
            "ranked corpus"
        );
        Ok(ranked)
    }

    /// Embed the query and every corpus text.
    ///
    /// Batching providers get one call carrying the query and all texts;
    /// others get a single query call plus a bounded-concurrency fan-out.
    async fn embed_all(&self, query: &str, texts: &[String]) -> Result<(Vec<f32>, Vec<Vec<f32>>)> {
        if self.embedder.supports_batch() {
            let mut inputs = Vec::with_capacity(texts.len() + 1);
            inputs.push(query.to_string());
            inputs.extend_from_slice(texts);

            let mut vectors = self.embedder.embed_batch(&inputs).await?;
            if vectors.len() != inputs.len() {
                return Err(Error::Embedding(format!(
                    "Expected {} embeddings, got {}",
                    inputs.len(),
                    vectors.len()
                )));
            }

            let query_vector = vectors.remove(0);
            Ok((query_vector, vectors))
        } else {
            let query_vector = self.embedder.embed(query).await?;
            let text_vectors = self.fan_out(texts).await?;
            Ok((query_vector, text_vectors))
        }
    }

    /// Embed texts one call each, at most `max_concurrency` in flight.
    async fn fan_out(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks = JoinSet::new();

        for (i, text) in texts.iter().enumerate() {
            let semaphore = semaphore.clone();
            let embedder = self.embedder.clone();
            let text = text.clone();

            tasks.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return (i, Err(Error::Embedding("semaphore closed".to_string()))),
                };
                (i, embedder.embed(&text).await)
            });
        }

        let mut vectors: Vec<Option<Vec<f32>>> = vec![None; texts.len()];
        while let Some(joined) = tasks.join_next().await {
            let (i, result) = joined
                .map_err(|e| Error::Embedding(format!("embedding task failed: {}", e)))?;
            vectors[i] = Some(result?);
        }

        vectors
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| Error::Embedding("embedding task produced no vector".to_string()))
    }
}

/// Reorder store records to match ranked id order, dropping records with no
/// usable id and ids the store no longer has.
fn order_by_rank(records: Vec<serde_json::Value>, ids: &[String]) -> Vec<serde_json::Value> {
    let mut by_id: HashMap<String, serde_json::Value> = records
        .into_iter()
        .filter_map(|record| {
            let id = record.get("id").and_then(|v| v.as_str())?.to_string();
            Some((id, record))
        })
        .collect();

    ids.iter().filter_map(|id| by_id.remove(id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_order_by_rank_follows_id_order() {
        let records = vec![
            json!({"id": "b", "title": "Second"}),
            json!({"id": "a", "title": "First"}),
        ];
        let ids = vec!["a".to_string(), "b".to_string()];

        let ordered = order_by_rank(records, &ids);
        assert_eq!(ordered[0]["title"], "First");
        assert_eq!(ordered[1]["title"], "Second");
    }

    #[test]
    fn test_order_by_rank_drops_missing_and_idless() {
        let records = vec![json!({"id": "a"}), json!({"title": "no id"})];
        let ids = vec!["a".to_string(), "gone".to_string()];

        let ordered = order_by_rank(records, &ids);
        assert_eq!(ordered.len(), 1);
        assert_eq!(ordered[0]["id"], "a");
    }
}
