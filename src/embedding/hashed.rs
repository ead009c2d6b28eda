//! Deterministic hash-based embeddings.
//!
//! Degraded mode for running without an embedding API: case-folds the text,
//! digests it with SHA-256, maps each digest byte to a scalar in [0, 1], and
//! cyclically repeats the result out to the configured dimension. Identical
//! text always yields an identical vector; texts sharing a digest collide.
//! Retrieval order under this provider is deterministic but not semantically
//! meaningful.

use super::Embedder;
use crate::error::Result;
use async_trait::async_trait;
use sha2::{Digest, Sha256};

/// Deterministic fallback embedder.
pub struct HashedEmbedder {
    dimensions: usize,
}

impl HashedEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn text_to_vector(&self, text: &str) -> Vec<f32> {
        let digest = Sha256::digest(text.to_lowercase().as_bytes());

        let mut vector = Vec::with_capacity(self.dimensions);
        for i in 0..self.dimensions {
            let byte = digest[i % digest.len()];
            vector.push(byte as f32 / 255.0);
        }
        vector
    }
}

#[async_trait]
impl Embedder for HashedEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.text_to_vector(t)).collect())
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.text_to_vector(text))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_deterministic() {
        let embedder = HashedEmbedder::new(384);
        let a = embedder.embed_query("the quick brown fox").await.unwrap();
        let b = embedder.embed_query("the quick brown fox").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_case_folded() {
        let embedder = HashedEmbedder::new(384);
        let lower = embedder.embed_query("hello world").await.unwrap();
        let upper = embedder.embed_query("HELLO World").await.unwrap();
        assert_eq!(lower, upper);
    }

    #[tokio::test]
    async fn test_distinct_texts_differ() {
        let embedder = HashedEmbedder::new(384);
        let a = embedder.embed_query("first text").await.unwrap();
        let b = embedder.embed_query("second text").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_dimension_and_range() {
        let embedder = HashedEmbedder::new(100);
        let v = embedder.embed_query("anything at all").await.unwrap();
        assert_eq!(v.len(), 100);
        assert!(v.iter().all(|x| (0.0..=1.0).contains(x)));
        // Cyclic repetition past the 32-byte digest.
        assert_eq!(v[0], v[32]);
        assert_eq!(v[5], v[37]);
    }

    #[tokio::test]
    async fn test_batch_matches_single() {
        let embedder = HashedEmbedder::new(64);
        let batch = embedder
            .embed(&["one".to_string(), "two".to_string()])
            .await
            .unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0], embedder.embed_query("one").await.unwrap());
        assert_eq!(batch[1], embedder.embed_query("two").await.unwrap());
    }
}
