//! Content-hash embedding cache.
//!
//! Wraps any [`EmbeddingProvider`] with an in-memory map keyed by the blake3
//! hash of the text. Repeat searches over an unchanged corpus skip the
//! provider entirely; a changed text hashes to a new key, so staleness is
//! impossible.

use crate::embeddings::provider::EmbeddingProvider;
use crate::types::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

type Key = [u8; 32];

/// Caching wrapper around an embedding provider.
pub struct CachedEmbedder {
    inner: Arc<dyn EmbeddingProvider>,
    cache: Mutex<HashMap<Key, Vec<f32>>>,
}

impl CachedEmbedder {
    /// Wrap a provider with an empty cache.
    pub fn new(inner: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Number of cached vectors.
    pub fn len(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn key(text: &str) -> Key {
        *blake3::hash(text.as_bytes()).as_bytes()
    }

    fn lookup(&self, key: &Key) -> Result<Option<Vec<f32>>> {
        let cache = self
            .cache
            .lock()
            .map_err(|_| Error::Embedding("embedding cache lock poisoned".to_string()))?;
        Ok(cache.get(key).cloned())
    }

    fn store(&self, key: Key, vector: Vec<f32>) -> Result<()> {
        let mut cache = self
            .cache
            .lock()
            .map_err(|_| Error::Embedding("embedding cache lock poisoned".to_string()))?;
        cache.insert(key, vector);
        Ok(())
    }
}

#[async_trait]
impl EmbeddingProvider for CachedEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let key = Self::key(text);
        if let Some(hit) = self.lookup(&key)? {
            return Ok(hit);
        }

        let vector = self.inner.embed(text).await?;
        self.store(key, vector.clone())?;
        Ok(vector)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let keys: Vec<Key> = texts.iter().map(|t| Self::key(t)).collect();

        let mut results: Vec<Option<Vec<f32>>> = Vec::with_capacity(texts.len());
        let mut miss_indices = Vec::new();
        let mut miss_texts = Vec::new();

        for (i, key) in keys.iter().enumerate() {
            match self.lookup(key)? {
                Some(hit) => results.push(Some(hit)),
                None => {
                    results.push(None);
                    miss_indices.push(i);
                    miss_texts.push(texts[i].clone());
                }
            }
        }

        if !miss_texts.is_empty() {
            let fresh = self.inner.embed_batch(&miss_texts).await?;
            if fresh.len() != miss_texts.len() {
                return Err(Error::Embedding(format!(
                    "Expected {} embeddings, got {}",
                    miss_texts.len(),
                    fresh.len()
                )));
            }

            for (slot, vector) in miss_indices.into_iter().zip(fresh) {
                self.store(keys[slot], vector.clone())?;
                results[slot] = Some(vector);
            }
        }

        Ok(results.into_iter().flatten().collect())
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    fn supports_batch(&self) -> bool {
        self.inner.supports_batch()
    }
}
