//! Per-tenant vector store abstraction.
//!
//! Every chunk lives in exactly one collection, determined solely by the
//! owning user and the content domain. Reads against a collection that was
//! never written are not errors: absence and emptiness are indistinguishable.

mod memory;
mod sqlite;

pub use memory::MemoryVectorStore;
pub use sqlite::SqliteVectorStore;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Content domain a chunk belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Document,
    Video,
}

impl Domain {
    /// Storage namespace suffix for this domain.
    pub fn suffix(&self) -> &'static str {
        match self {
            Domain::Document => "notes",
            Domain::Video => "youtube",
        }
    }
}

impl std::str::FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "document" | "documents" | "notes" => Ok(Domain::Document),
            "video" | "videos" | "youtube" => Ok(Domain::Video),
            _ => Err(format!("Unknown domain: {}", s)),
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Domain::Document => write!(f, "document"),
            Domain::Video => write!(f, "video"),
        }
    }
}

/// Deterministic storage namespace for one `(user_id, domain)` pair.
///
/// Distinct inputs never alias the same namespace: the user id is sanitized
/// character-by-character (no collapsing) and the domain suffix is appended.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionKey(String);

impl CollectionKey {
    /// Resolve the collection for a user and domain.
    pub fn resolve(user_id: &str, domain: Domain) -> Self {
        let sanitized: String = user_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        Self(format!("user_{}_{}", sanitized, domain.suffix()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CollectionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An immutable stored unit of text with its metadata and embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Globally unique chunk ID, freshly generated at ingestion.
    pub doc_id: Uuid,
    /// Owning user.
    pub user_id: String,
    /// Content domain.
    pub domain: Domain,
    /// Source identifier: filename (document) or video id (video).
    pub source_id: String,
    /// Display title: filename or video title.
    pub title: String,
    /// Channel name (video domain).
    pub channel: Option<String>,
    /// Text content of this chunk.
    pub content: String,
    /// Start time in the source video, in seconds.
    pub start_time: Option<f64>,
    /// End time in the source video, in seconds.
    pub end_time: Option<f64>,
    /// Transcript language code.
    pub language: Option<String>,
    /// Link back to the source, with a time offset where applicable.
    pub source_url: Option<String>,
    /// How the content arrived (e.g. "pasted"); None for fetched content.
    pub origin: Option<String>,
    /// Embedding vector.
    pub embedding: Vec<f32>,
    /// When this chunk was indexed.
    pub indexed_at: DateTime<Utc>,
}

impl Chunk {
    /// Create a document-domain chunk.
    pub fn document(user_id: &str, filename: &str, content: String, embedding: Vec<f32>) -> Self {
        Self {
            doc_id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            domain: Domain::Document,
            source_id: filename.to_string(),
            title: filename.to_string(),
            channel: None,
            content,
            start_time: None,
            end_time: None,
            language: None,
            source_url: None,
            origin: None,
            embedding,
            indexed_at: Utc::now(),
        }
    }

    /// First 200 characters of the content, with an ellipsis.
    pub fn preview(&self) -> String {
        let mut preview: String = self.content.chars().take(200).collect();
        preview.push_str("...");
        preview
    }

    /// Start time formatted as mm:ss.
    pub fn format_timestamp(&self) -> String {
        let total = self.start_time.unwrap_or(0.0) as u64;
        format!("{:02}:{:02}", total / 60, total % 60)
    }
}

/// A retrieved chunk with its similarity score.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub chunk: Chunk,
    /// Cosine similarity (higher is better).
    pub score: f32,
}

/// Summary of one ingested source within a collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSummary {
    /// Filename or video id.
    pub content_id: String,
    pub title: String,
    pub channel: Option<String>,
    pub chunk_count: u32,
}

/// Trait for vector store backends.
///
/// `query`, `count`, and `list_sources` on an absent collection return
/// empty/zero. Write failures surface as storage errors, never silently.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert chunks into a collection, keyed by `doc_id`. The collection is
    /// created lazily on first write.
    async fn upsert(&self, key: &CollectionKey, chunks: &[Chunk]) -> Result<usize>;

    /// Return up to `k` nearest chunks; ties rank by insertion order.
    async fn query(
        &self,
        key: &CollectionKey,
        embedding: &[f32],
        k: usize,
    ) -> Result<Vec<SearchResult>>;

    /// Number of chunks in the collection; 0 when it does not exist.
    async fn count(&self, key: &CollectionKey) -> Result<usize>;

    /// Delete all chunks matching a source id (filename or video id).
    /// Returns the number deleted; 0 when nothing matches.
    async fn delete_by_source(&self, key: &CollectionKey, source_id: &str) -> Result<usize>;

    /// Remove the whole collection. A no-op success when it is absent.
    async fn delete_all(&self, key: &CollectionKey) -> Result<()>;

    /// Distinct sources in the collection, in first-ingested order.
    async fn list_sources(&self, key: &CollectionKey) -> Result<Vec<SourceSummary>>;
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
