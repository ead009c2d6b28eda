//! SQLite-based vector store implementation.
//!
//! Uses SQLite with cosine similarity computed in Rust for simplicity.
//! Collections are rows sharing a `collection` column; a collection with no
//! rows and a collection that never existed look identical to readers, which
//! is exactly the contract. Row order (rowid) is the tie-break for equal
//! similarity scores.

use super::{cosine_similarity, Chunk, CollectionKey, Domain, SearchResult, SourceSummary, VectorStore};
use crate::error::{MinneError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS chunks (
    doc_id TEXT PRIMARY KEY,
    collection TEXT NOT NULL,
    user_id TEXT NOT NULL,
    domain TEXT NOT NULL,
    source_id TEXT NOT NULL,
    title TEXT NOT NULL,
    channel TEXT,
    content TEXT NOT NULL,
    start_time REAL,
    end_time REAL,
    language TEXT,
    source_url TEXT,
    origin TEXT,
    embedding BLOB NOT NULL,
    indexed_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_chunks_collection ON chunks(collection);
CREATE INDEX IF NOT EXISTS idx_chunks_source ON chunks(collection, source_id);
"#;

/// SQLite-based vector store.
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
}

impl SqliteVectorStore {
    /// Create a new SQLite vector store.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // WAL mode for better concurrent performance.
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite vector store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite vector store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| MinneError::Storage(format!("Failed to acquire lock: {}", e)))
    }

    /// Serialize embedding to bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }

    /// Dimension of the vectors already stored in a collection, if any.
    fn stored_dimension(conn: &Connection, key: &CollectionKey) -> Result<Option<usize>> {
        let bytes: Option<i64> = conn
            .query_row(
                "SELECT LENGTH(embedding) FROM chunks WHERE collection = ?1 ORDER BY rowid LIMIT 1",
                params![key.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(bytes.map(|b| b as usize / 4))
    }

    fn row_to_chunk(row: &rusqlite::Row<'_>) -> rusqlite::Result<Chunk> {
        let doc_id_str: String = row.get(0)?;
        let domain_str: String = row.get(3)?;
        let embedding_bytes: Vec<u8> = row.get(13)?;
        let indexed_at_str: String = row.get(14)?;

        Ok(Chunk {
            doc_id: uuid::Uuid::parse_str(&doc_id_str).unwrap_or_default(),
            user_id: row.get(2)?,
            domain: if domain_str == "video" {
                Domain::Video
            } else {
                Domain::Document
            },
            source_id: row.get(4)?,
            title: row.get(5)?,
            channel: row.get(6)?,
            content: row.get(7)?,
            start_time: row.get(8)?,
            end_time: row.get(9)?,
            language: row.get(10)?,
            source_url: row.get(11)?,
            origin: row.get(12)?,
            embedding: Self::bytes_to_embedding(&embedding_bytes),
            indexed_at: DateTime::parse_from_rfc3339(&indexed_at_str)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }
}

const CHUNK_COLUMNS: &str = "doc_id, collection, user_id, domain, source_id, title, channel, \
     content, start_time, end_time, language, source_url, origin, embedding, indexed_at";

#[async_trait]
impl VectorStore for SqliteVectorStore {
    #[instrument(skip(self, chunks), fields(collection = %key, count = chunks.len()))]
    async fn upsert(&self, key: &CollectionKey, chunks: &[Chunk]) -> Result<usize> {
        let conn = self.lock()?;

        // All vectors in one collection share one dimension.
        let expected = Self::stored_dimension(&conn, key)?
            .or_else(|| chunks.first().map(|c| c.embedding.len()));
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

        let tx = conn.unchecked_transaction()?;

        for chunk in chunks {
            let embedding_bytes = Self::embedding_to_bytes(&chunk.embedding);

            tx.execute(
                r#"
                INSERT OR REPLACE INTO chunks
                (doc_id, collection, user_id, domain, source_id, title, channel,
                 content, start_time, end_time, language, source_url, origin,
                 embedding, indexed_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
                "#,
                params![
                    chunk.doc_id.to_string(),
                    key.as_str(),
                    chunk.user_id,
                    chunk.domain.to_string(),
                    chunk.source_id,
                    chunk.title,
                    chunk.channel,
                    chunk.content,
                    chunk.start_time,
                    chunk.end_time,
                    chunk.language,
                    chunk.source_url,
                    chunk.origin,
                    embedding_bytes,
                    chunk.indexed_at.to_rfc3339(),
                ],
            )?;
        }

        tx.commit()?;
        info!("Upserted {} chunks into {}", chunks.len(), key);
        Ok(chunks.len())
    }

    #[instrument(skip(self, embedding), fields(collection = %key))]
    async fn query(
        &self,
        key: &CollectionKey,
        embedding: &[f32],
        k: usize,
    ) -> Result<Vec<SearchResult>> {
        let conn = self.lock()?;

        if let Some(stored) = Self::stored_dimension(&conn, key)? {
            if stored != embedding.len() {
                return Err(MinneError::Storage(format!(
                    "Embedding dimension mismatch in {}: collection stores {}-dim vectors, query has {}",
                    key,
                    stored,
                    embedding.len()
                )));
            }
        }

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM chunks WHERE collection = ?1 ORDER BY rowid",
            CHUNK_COLUMNS
        ))?;

        let chunks = stmt.query_map(params![key.as_str()], Self::row_to_chunk)?;

        let mut results: Vec<SearchResult> = chunks
            .filter_map(|chunk| chunk.ok())
            .map(|chunk| SearchResult {
                score: cosine_similarity(embedding, &chunk.embedding),
                chunk,
            })
            .collect();

        // Stable sort keeps rowid order among equal scores.
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(k);

        debug!("Found {} matching chunks", results.len());
        Ok(results)
    }

    async fn count(&self, key: &CollectionKey) -> Result<usize> {
        let conn = self.lock()?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM chunks WHERE collection = ?1",
            params![key.as_str()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    #[instrument(skip(self), fields(collection = %key))]
    async fn delete_by_source(&self, key: &CollectionKey, source_id: &str) -> Result<usize> {
        let conn = self.lock()?;

        let deleted = conn.execute(
            "DELETE FROM chunks WHERE collection = ?1 AND source_id = ?2",
            params![key.as_str(), source_id],
        )?;

        info!("Deleted {} chunks for source {}", deleted, source_id);
        Ok(deleted)
    }

    #[instrument(skip(self), fields(collection = %key))]
    async fn delete_all(&self, key: &CollectionKey) -> Result<()> {
        let conn = self.lock()?;

        let deleted = conn.execute(
            "DELETE FROM chunks WHERE collection = ?1",
            params![key.as_str()],
        )?;

        info!("Deleted collection {} ({} chunks)", key, deleted);
        Ok(())
    }

    async fn list_sources(&self, key: &CollectionKey) -> Result<Vec<SourceSummary>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT source_id, title, channel, COUNT(*) as chunk_count
            FROM chunks
            WHERE collection = ?1
            GROUP BY source_id
            ORDER BY MIN(rowid)
            "#,
        )?;

        let sources = stmt.query_map(params![key.as_str()], |row| {
            Ok(SourceSummary {
                content_id: row.get(0)?,
                title: row.get(1)?,
                channel: row.get(2)?,
                chunk_count: row.get(3)?,
            })
        })?;

        Ok(sources.filter_map(|s| s.ok()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(source: &str, content: &str, embedding: Vec<f32>) -> Chunk {
        Chunk::document("u1", source, content.to_string(), embedding)
    }

    fn key() -> CollectionKey {
        CollectionKey::resolve("u1", Domain::Document)
    }

    #[tokio::test]
    async fn test_upsert_query_delete() {
        let store = SqliteVectorStore::in_memory().unwrap();

        store
            .upsert(
                &key(),
                &[
                    chunk("a.txt", "first chunk", vec![1.0, 0.0, 0.0]),
                    chunk("a.txt", "second chunk", vec![0.0, 1.0, 0.0]),
                ],
            )
            .await
            .unwrap();

        assert_eq!(store.count(&key()).await.unwrap(), 2);

        let results = store.query(&key(), &[1.0, 0.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.content, "first chunk");
        assert!((results[0].score - 1.0).abs() < 0.001);

        let deleted = store.delete_by_source(&key(), "a.txt").await.unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(store.count(&key()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_absent_collection_reads_are_empty() {
        let store = SqliteVectorStore::in_memory().unwrap();
        let missing = CollectionKey::resolve("ghost", Domain::Video);

        assert_eq!(store.count(&missing).await.unwrap(), 0);
        assert!(store.query(&missing, &[1.0], 3).await.unwrap().is_empty());
        assert!(store.list_sources(&missing).await.unwrap().is_empty());
        store.delete_all(&missing).await.unwrap();
    }

    #[tokio::test]
    async fn test_tie_break_by_rowid() {
        let store = SqliteVectorStore::in_memory().unwrap();
        store
            .upsert(
                &key(),
                &[
                    chunk("a.txt", "first", vec![1.0, 0.0]),
                    chunk("a.txt", "second", vec![1.0, 0.0]),
                ],
            )
            .await
            .unwrap();

        let results = store.query(&key(), &[1.0, 0.0], 2).await.unwrap();
        assert_eq!(results[0].chunk.content, "first");
        assert_eq!(results[1].chunk.content, "second");
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_rejected() {
        let store = SqliteVectorStore::in_memory().unwrap();
        store
            .upsert(&key(), &[chunk("a.txt", "stored", vec![0.1, 0.2, 0.3, 0.4])])
            .await
            .unwrap();

        // A persisted collection rejects queries from a provider with a
        // different dimension instead of scoring every pair as 0.0.
        let err = store.query(&key(), &[1.0; 6], 3).await.unwrap_err();
        assert!(matches!(err, MinneError::Storage(_)));

        let err = store
            .upsert(&key(), &[chunk("b.txt", "wide", vec![1.0; 6])])
            .await
            .unwrap_err();
        assert!(matches!(err, MinneError::Storage(_)));
        assert_eq!(store.count(&key()).await.unwrap(), 1);

        // Matching dimension still works.
        let results = store.query(&key(), &[0.1, 0.2, 0.3, 0.4], 3).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_collection_isolation() {
        let store = SqliteVectorStore::in_memory().unwrap();
        let other_user = CollectionKey::resolve("u2", Domain::Document);
        let other_domain = CollectionKey::resolve("u1", Domain::Video);

        store.upsert(&key(), &[chunk("a.txt", "mine", vec![1.0])]).await.unwrap();

        assert_eq!(store.count(&key()).await.unwrap(), 1);
        assert_eq!(store.count(&other_user).await.unwrap(), 0);
        assert_eq!(store.count(&other_domain).await.unwrap(), 0);

        store.delete_all(&other_user).await.unwrap();
        assert_eq!(store.count(&key()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_metadata_round_trip() {
        let store = SqliteVectorStore::in_memory().unwrap();
        let video_key = CollectionKey::resolve("u1", Domain::Video);

        let mut c = Chunk::document("u1", "dQw4w9WgXcQ", "transcript text".to_string(), vec![0.5]);
        c.domain = Domain::Video;
        c.title = "Some Video".to_string();
        c.channel = Some("Some Channel".to_string());
        c.start_time = Some(42.0);
        c.end_time = Some(90.0);
        c.language = Some("en".to_string());
        c.source_url = Some("https://youtu.be/dQw4w9WgXcQ?t=42".to_string());

        store.upsert(&video_key, &[c]).await.unwrap();

        let results = store.query(&video_key, &[0.5], 1).await.unwrap();
        let got = &results[0].chunk;
        assert_eq!(got.domain, Domain::Video);
        assert_eq!(got.title, "Some Video");
        assert_eq!(got.channel.as_deref(), Some("Some Channel"));
        assert_eq!(got.start_time, Some(42.0));
        assert_eq!(got.language.as_deref(), Some("en"));
        assert_eq!(got.source_url.as_deref(), Some("https://youtu.be/dQw4w9WgXcQ?t=42"));
    }

    #[tokio::test]
    async fn test_persistence_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vectors.db");

        {
            let store = SqliteVectorStore::new(&path).unwrap();
            store.upsert(&key(), &[chunk("a.txt", "persisted", vec![1.0])]).await.unwrap();
        }

        let store = SqliteVectorStore::new(&path).unwrap();
        assert_eq!(store.count(&key()).await.unwrap(), 1);
        let sources = store.list_sources(&key()).await.unwrap();
        assert_eq!(sources[0].content_id, "a.txt");
    }
}
