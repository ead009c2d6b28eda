//! In-memory vector store implementation.
//!
//! Useful for testing and ephemeral sessions. Each collection keeps its
//! chunks in insertion order, which doubles as the tie-break for equal
//! similarity scores.

use super::{cosine_similarity, Chunk, CollectionKey, SearchResult, SourceSummary, VectorStore};
use crate::error::{MinneError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory vector store.
pub struct MemoryVectorStore {
    collections: RwLock<HashMap<String, Vec<Chunk>>>,
}

impl MemoryVectorStore {
    /// Create a new in-memory vector store.
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn upsert(&self, key: &CollectionKey, chunks: &[Chunk]) -> Result<usize> {
        let mut collections = self
            .collections
            .write()
            .map_err(|e| MinneError::Storage(format!("Failed to acquire lock: {}", e)))?;

        // All vectors in one collection share one dimension.
        let expected = collections
            .get(key.as_str())
            .and_then(|c| c.first())
            .or_else(|| chunks.first())
            .map(|c| c.embedding.len());
        if let Some(expected) = expected {
            if let Some(bad) = chunks.iter().find(|c| c.embedding.len() != expected) {
                return Err(MinneError::Storage(format!(
                    "Embedding dimension mismatch in {}: collection stores {}-dim vectors, got {}",
                    key,
                    expected,
                    bad.embedding.len()
                )));
            }
        }

        let collection = collections.entry(key.as_str().to_string()).or_default();
        collection.extend(chunks.iter().cloned());
        Ok(chunks.len())
    }

    async fn query(
        &self,
        key: &CollectionKey,
        embedding: &[f32],
        k: usize,
    ) -> Result<Vec<SearchResult>> {
        let collections = self
            .collections
            .read()
            .map_err(|e| MinneError::Storage(format!("Failed to acquire lock: {}", e)))?;

        let Some(collection) = collections.get(key.as_str()) else {
            return Ok(Vec::new());
        };

        if let Some(stored) = collection.first().map(|c| c.embedding.len()) {
            if stored != embedding.len() {
                return Err(MinneError::Storage(format!(
                    "Embedding dimension mismatch in {}: collection stores {}-dim vectors, query has {}",
                    key,
                    stored,
                    embedding.len()
                )));
            }
        }

        let mut results: Vec<SearchResult> = collection
            .iter()
            .map(|chunk| SearchResult {
                score: cosine_similarity(embedding, &chunk.embedding),
                chunk: chunk.clone(),
            })
            .collect();

        // Stable sort keeps insertion order among equal scores.
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(k);

        Ok(results)
    }

    async fn count(&self, key: &CollectionKey) -> Result<usize> {
        let collections = self
            .collections
            .read()
            .map_err(|e| MinneError::Storage(format!("Failed to acquire lock: {}", e)))?;

        Ok(collections.get(key.as_str()).map_or(0, |c| c.len()))
    }

    async fn delete_by_source(&self, key: &CollectionKey, source_id: &str) -> Result<usize> {
        let mut collections = self
            .collections
            .write()
            .map_err(|e| MinneError::Storage(format!("Failed to acquire lock: {}", e)))?;

        let Some(collection) = collections.get_mut(key.as_str()) else {
            return Ok(0);
        };

        let initial_len = collection.len();
        collection.retain(|chunk| chunk.source_id != source_id);
        Ok(initial_len - collection.len())
    }

    async fn delete_all(&self, key: &CollectionKey) -> Result<()> {
        let mut collections = self
            .collections
            .write()
            .map_err(|e| MinneError::Storage(format!("Failed to acquire lock: {}", e)))?;

        collections.remove(key.as_str());
        Ok(())
    }

    async fn list_sources(&self, key: &CollectionKey) -> Result<Vec<SourceSummary>> {
        let collections = self
            .collections
            .read()
            .map_err(|e| MinneError::Storage(format!("Failed to acquire lock: {}", e)))?;

        let Some(collection) = collections.get(key.as_str()) else {
            return Ok(Vec::new());
        };

        let mut order: Vec<String> = Vec::new();
        let mut summaries: HashMap<String, SourceSummary> = HashMap::new();

        for chunk in collection {
            let entry = summaries
                .entry(chunk.source_id.clone())
                .or_insert_with(|| {
                    order.push(chunk.source_id.clone());
                    SourceSummary {
                        content_id: chunk.source_id.clone(),
                        title: chunk.title.clone(),
                        channel: chunk.channel.clone(),
                        chunk_count: 0,
                    }
                });
            entry.chunk_count += 1;
        }

        Ok(order
            .into_iter()
            .filter_map(|id| summaries.remove(&id))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::Domain;

    fn chunk(source: &str, content: &str, embedding: Vec<f32>) -> Chunk {
        Chunk::document("u1", source, content.to_string(), embedding)
    }

    fn key() -> CollectionKey {
        CollectionKey::resolve("u1", Domain::Document)
    }

    #[tokio::test]
    async fn test_absent_collection_reads() {
        let store = MemoryVectorStore::new();
        let missing = CollectionKey::resolve("nobody", Domain::Video);

        assert_eq!(store.count(&missing).await.unwrap(), 0);
        assert!(store.query(&missing, &[1.0, 0.0], 5).await.unwrap().is_empty());
        assert!(store.list_sources(&missing).await.unwrap().is_empty());
        assert_eq!(store.delete_by_source(&missing, "x").await.unwrap(), 0);
        store.delete_all(&missing).await.unwrap();
    }

    #[tokio::test]
    async fn test_query_ranks_and_truncates() {
        let store = MemoryVectorStore::new();
        store
            .upsert(
                &key(),
                &[
                    chunk("a.txt", "far", vec![0.0, 1.0]),
                    chunk("a.txt", "near", vec![1.0, 0.0]),
                    chunk("a.txt", "mid", vec![0.7, 0.7]),
                ],
            )
            .await
            .unwrap();

        let results = store.query(&key(), &[1.0, 0.0], 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.content, "near");
        assert_eq!(results[1].chunk.content, "mid");
    }

    #[tokio::test]
    async fn test_tie_break_by_insertion_order() {
        let store = MemoryVectorStore::new();
        store
            .upsert(
                &key(),
                &[
                    chunk("a.txt", "first", vec![1.0, 0.0]),
                    chunk("a.txt", "second", vec![1.0, 0.0]),
                    chunk("a.txt", "third", vec![1.0, 0.0]),
                ],
            )
            .await
            .unwrap();

        let results = store.query(&key(), &[1.0, 0.0], 3).await.unwrap();
        let contents: Vec<&str> = results.iter().map(|r| r.chunk.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_rejected() {
        let store = MemoryVectorStore::new();
        store
            .upsert(
                &key(),
                &[
                    chunk("a.txt", "one", vec![0.1, 0.2, 0.3, 0.4]),
                    chunk("a.txt", "two", vec![0.5, 0.6, 0.7, 0.8]),
                    chunk("a.txt", "three", vec![0.9, 0.1, 0.2, 0.3]),
                ],
            )
            .await
            .unwrap();

        // A query vector from a different provider dimension is an error,
        // not a full scan of zero scores.
        let err = store
            .query(&key(), &[1.0; 6], 3)
            .await
            .unwrap_err();
        assert!(matches!(err, MinneError::Storage(_)));

        // So is widening the collection with mismatched vectors.
        let err = store
            .upsert(&key(), &[chunk("b.txt", "wide", vec![1.0; 6])])
            .await
            .unwrap_err();
        assert!(matches!(err, MinneError::Storage(_)));
        assert_eq!(store.count(&key()).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_mixed_dimension_batch_is_rejected() {
        let store = MemoryVectorStore::new();
        let err = store
            .upsert(
                &key(),
                &[
                    chunk("a.txt", "one", vec![1.0, 0.0]),
                    chunk("a.txt", "two", vec![1.0, 0.0, 0.0]),
                ],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, MinneError::Storage(_)));
        assert_eq!(store.count(&key()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_by_source() {
        let store = MemoryVectorStore::new();
        store
            .upsert(
                &key(),
                &[
                    chunk("a.txt", "one", vec![1.0]),
                    chunk("a.txt", "two", vec![1.0]),
                    chunk("b.txt", "three", vec![1.0]),
                ],
            )
            .await
            .unwrap();

        let deleted = store.delete_by_source(&key(), "a.txt").await.unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(store.count(&key()).await.unwrap(), 1);

        let sources = store.list_sources(&key()).await.unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].content_id, "b.txt");
    }

    #[tokio::test]
    async fn test_collections_are_isolated() {
        let store = MemoryVectorStore::new();
        let other = CollectionKey::resolve("u2", Domain::Document);

        store.upsert(&key(), &[chunk("a.txt", "mine", vec![1.0])]).await.unwrap();

        assert_eq!(store.count(&key()).await.unwrap(), 1);
        assert_eq!(store.count(&other).await.unwrap(), 0);

        store.delete_all(&other).await.unwrap();
        assert_eq!(store.count(&key()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_sources_in_first_ingested_order() {
        let store = MemoryVectorStore::new();
        store
            .upsert(
                &key(),
                &[
                    chunk("z.txt", "z1", vec![1.0]),
                    chunk("a.txt", "a1", vec![1.0]),
                    chunk("z.txt", "z2", vec![1.0]),
                ],
            )
            .await
            .unwrap();

        let sources = store.list_sources(&key()).await.unwrap();
        assert_eq!(sources[0].content_id, "z.txt");
        assert_eq!(sources[0].chunk_count, 2);
        assert_eq!(sources[1].content_id, "a.txt");
    }
}
