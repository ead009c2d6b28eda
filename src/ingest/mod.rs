//! Ingestion pipeline: raw content in, embedded chunks in the right
//! per-user collection out.
//!
//! Documents go straight through the segmenter; video transcripts are first
//! grouped into time windows so chunks keep usable timestamps. Validation
//! happens before any external call.

use crate::config::ChunkingSettings;
use crate::embedding::Embedder;
use crate::error::{MinneError, Result};
use crate::segmenter::TextSegmenter;
use crate::transcript::TranscriptWindower;
use crate::vector_store::{Chunk, CollectionKey, Domain, VectorStore};
use crate::youtube::{
    extract_video_id, timestamped_url, MetadataSource, TranscriptSource, VideoMetadata,
};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Minimum length for a pasted transcript, in characters.
const MIN_PASTED_LENGTH: usize = 50;

/// Result of one ingestion call.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub success: bool,
    pub message: String,
    pub chunks_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_data: Option<VideoData>,
}

/// Summary of an ingested video or pasted transcript.
#[derive(Debug, Clone, Serialize)]
pub struct VideoData {
    pub video_id: String,
    pub title: String,
    pub channel: String,
    pub thumbnail: String,
    pub length: u32,
    pub language: String,
    pub chunks_count: usize,
}

/// Composes windowing, segmentation, metadata tagging, embedding, and
/// storage for all three content types.
pub struct IngestionPipeline {
    segmenter: TextSegmenter,
    windower: TranscriptWindower,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    transcripts: Arc<dyn TranscriptSource>,
    metadata: Arc<dyn MetadataSource>,
}

impl IngestionPipeline {
    pub fn new(
        chunking: &ChunkingSettings,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        transcripts: Arc<dyn TranscriptSource>,
        metadata: Arc<dyn MetadataSource>,
    ) -> Self {
        Self {
            segmenter: TextSegmenter::new(chunking.chunk_size, chunking.chunk_overlap),
            windower: TranscriptWindower::new(chunking.window_threshold),
            embedder,
            store,
            transcripts,
            metadata,
        }
    }

    /// Ingest an already-extracted document text for a user.
    #[instrument(skip(self, text), fields(user_id = %user_id, filename = %filename))]
    pub async fn ingest_document(
        &self,
        text: &str,
        user_id: &str,
        filename: &str,
    ) -> Result<IngestReport> {
        if text.trim().is_empty() {
            return Err(MinneError::Validation(
                "Could not extract content from file".to_string(),
            ));
        }

        let segments = self.segmenter.segment(text);
        info!("Split document into {} chunks", segments.len());

        let embeddings = self.embedder.embed(&segments).await?;

        let chunks: Vec<Chunk> = segments
            .into_iter()
            .zip(embeddings)
            .map(|(content, embedding)| Chunk::document(user_id, filename, content, embedding))
            .collect();

        let key = CollectionKey::resolve(user_id, Domain::Document);
        let stored = self.store.upsert(&key, &chunks).await?;

        Ok(IngestReport {
            success: true,
            message: format!("Successfully processed {} chunks from {}", stored, filename),
            chunks_count: stored,
            video_data: None,
        })
    }

    /// Ingest a YouTube video by URL or bare id. Metadata is best-effort;
    /// the transcript is required.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn ingest_video(
        &self,
        url_or_id: &str,
        user_id: &str,
        language: &str,
    ) -> Result<IngestReport> {
        let video_id = extract_video_id(url_or_id).ok_or_else(|| {
            MinneError::Validation(format!("Invalid YouTube URL or video ID: {}", url_or_id))
        })?;

        let metadata = match self.metadata.fetch_metadata(&video_id).await {
            Ok(meta) => meta,
            Err(e) => {
                warn!("Metadata fetch failed ({}), using placeholder", e);
                VideoMetadata::placeholder(&video_id)
            }
        };

        let transcript = self.transcripts.fetch_transcript(&video_id, language).await?;
        let windows = self.windower.window(&transcript.entries);

        let mut texts: Vec<String> = Vec::new();
        let mut spans: Vec<(f64, f64)> = Vec::new();
        for window in &windows {
            for segment in self.segmenter.segment(&window.text) {
                texts.push(segment);
                spans.push((window.start_time, window.end_time));
            }
        }

        if texts.is_empty() {
            return Err(MinneError::Validation(
                "Transcript contained no usable text".to_string(),
            ));
        }

        let embeddings = self.embedder.embed(&texts).await?;

        let chunks: Vec<Chunk> = texts
            .into_iter()
            .zip(embeddings)
            .zip(spans)
            .map(|((content, embedding), (start, end))| {
                let mut chunk = Chunk::document(user_id, &video_id, content, embedding);
                chunk.domain = Domain::Video;
                chunk.title = metadata.title.clone();
                chunk.channel = Some(metadata.channel.clone());
                chunk.start_time = Some(start);
                chunk.end_time = Some(end);
                chunk.language = Some(transcript.language.clone());
                chunk.source_url = Some(timestamped_url(&video_id, start));
                chunk
            })
            .collect();

        let key = CollectionKey::resolve(user_id, Domain::Video);
        let stored = self.store.upsert(&key, &chunks).await?;

        Ok(IngestReport {
            success: true,
            message: format!("Processed '{}' - {} chunks", metadata.title, stored),
            chunks_count: stored,
            video_data: Some(VideoData {
                video_id,
                title: metadata.title,
                channel: metadata.channel,
                thumbnail: metadata.thumbnail_url,
                length: metadata.duration_seconds.unwrap_or(0),
                language: transcript.language,
                chunks_count: stored,
            }),
        })
    }

    /// Ingest a manually pasted transcript. No windowing: the paste has no
    /// timestamps, so it is stored as a single synthetic video.
    #[instrument(skip(self, text), fields(user_id = %user_id))]
    pub async fn ingest_pasted_transcript(
        &self,
        text: &str,
        user_id: &str,
        title: Option<&str>,
        url: Option<&str>,
    ) -> Result<IngestReport> {
        let cleaned = text.trim();
        if cleaned.chars().count() < MIN_PASTED_LENGTH {
            return Err(MinneError::Validation(
                "Transcript text is too short. Please paste a valid transcript.".to_string(),
            ));
        }

        // Timestamp for readability, uuid so ids never collide within a second.
        let video_id = format!(
            "pasted_{}_{}",
            Utc::now().timestamp(),
            Uuid::new_v4().simple()
        );
        let title = title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or("Pasted Video Transcript")
            .to_string();

        let segments = self.segmenter.segment(cleaned);
        let embeddings = self.embedder.embed(&segments).await?;

        let chunks: Vec<Chunk> = segments
            .into_iter()
            .zip(embeddings)
            .map(|(content, embedding)| {
                let mut chunk = Chunk::document(user_id, &video_id, content, embedding);
                chunk.domain = Domain::Video;
                chunk.title = title.clone();
                chunk.channel = Some("Manual Upload".to_string());
                chunk.origin = Some("pasted".to_string());
                chunk.source_url = url.filter(|u| !u.is_empty()).map(|u| u.to_string());
                chunk
            })
            .collect();

        let key = CollectionKey::resolve(user_id, Domain::Video);
        let stored = self.store.upsert(&key, &chunks).await?;

        Ok(IngestReport {
            success: true,
            message: format!(
                "Successfully processed pasted transcript - {} chunks created",
                stored
            ),
            chunks_count: stored,
            video_data: Some(VideoData {
                video_id,
                title,
                channel: "Manual Upload".to_string(),
                thumbnail: "https://via.placeholder.com/320x180?text=Pasted+Transcript".to_string(),
                length: 0,
                language: "unknown".to_string(),
                chunks_count: stored,
            }),
        })
    }
}
