//! Service boundary: the operations a transport layer calls.
//!
//! Every operation returns a uniform two-shape [`Reply`]: `{success: true,
//! ...payload}` or `{success: false, error}`. Errors never escape as panics
//! or raw results; the transport only needs to look at `success`.

use crate::config::{Prompts, Settings};
use crate::embedding::Embedder;
use crate::error::{MinneError, Result};
use crate::generation::Generator;
use crate::ingest::IngestionPipeline;
use crate::rag::RetrievalAnswerer;
use crate::vector_store::{CollectionKey, Domain, SourceSummary, VectorStore};
use crate::youtube::{MetadataSource, TranscriptSource};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::error;

/// Uniform operation result.
#[derive(Debug, Clone, Serialize)]
pub struct Reply {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl Reply {
    /// Success reply carrying the payload's fields at the top level.
    pub fn ok<T: Serialize>(payload: &T) -> Self {
        let mut data = match serde_json::to_value(payload) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                let mut map = Map::new();
                map.insert("data".to_string(), other);
                map
            }
            Err(e) => return Self::failure(&MinneError::Json(e)),
        };
        // The reply owns the success flag.
        data.remove("success");
        Self {
            success: true,
            error: None,
            data,
        }
    }

    pub fn failure(err: &MinneError) -> Self {
        Self {
            success: false,
            error: Some(err.to_string()),
            data: Map::new(),
        }
    }

    fn from_result<T: Serialize>(result: Result<T>) -> Self {
        match result {
            Ok(payload) => Self::ok(&payload),
            Err(e) => {
                error!("Operation failed: {}", e);
                Self::failure(&e)
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct InfoReport {
    count: usize,
    sources: Vec<SourceSummary>,
}

#[derive(Debug, Serialize)]
struct DeleteReport {
    message: String,
    deleted_count: usize,
}

/// The assembled application: ingestion, retrieval, and store maintenance.
///
/// The generator is optional; when no generation model survived its startup
/// probe, queries short-circuit with an unavailability error while ingestion
/// and maintenance keep working.
pub struct MinneService {
    store: Arc<dyn VectorStore>,
    pipeline: IngestionPipeline,
    answerer: Option<RetrievalAnswerer>,
}

impl MinneService {
    pub fn new(
        settings: &Settings,
        prompts: Prompts,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        generator: Option<Arc<dyn Generator>>,
        transcripts: Arc<dyn TranscriptSource>,
        metadata: Arc<dyn MetadataSource>,
    ) -> Self {
        let pipeline = IngestionPipeline::new(
            &settings.chunking,
            embedder.clone(),
            store.clone(),
            transcripts,
            metadata,
        );
        let answerer = generator.map(|generator| {
            RetrievalAnswerer::new(&settings.rag, prompts, embedder, store.clone(), generator)
        });

        Self {
            store,
            pipeline,
            answerer,
        }
    }

    pub async fn ingest_document(&self, text: &str, user_id: &str, filename: &str) -> Reply {
        Reply::from_result(self.pipeline.ingest_document(text, user_id, filename).await)
    }

    pub async fn ingest_video(&self, url_or_id: &str, user_id: &str, language: &str) -> Reply {
        Reply::from_result(self.pipeline.ingest_video(url_or_id, user_id, language).await)
    }

    pub async fn ingest_pasted_transcript(
        &self,
        text: &str,
        user_id: &str,
        title: Option<&str>,
        url: Option<&str>,
    ) -> Reply {
        Reply::from_result(
            self.pipeline
                .ingest_pasted_transcript(text, user_id, title, url)
                .await,
        )
    }

    pub async fn query(&self, domain: Domain, user_id: &str, question: &str) -> Reply {
        let Some(answerer) = &self.answerer else {
            return Reply::failure(&MinneError::Upstream(
                "Generation capability unavailable".to_string(),
            ));
        };

        let key = CollectionKey::resolve(user_id, domain);
        Reply::from_result(answerer.answer(&key, domain, question).await)
    }

    pub async fn info(&self, domain: Domain, user_id: &str) -> Reply {
        let key = CollectionKey::resolve(user_id, domain);
        let report = async {
            Ok(InfoReport {
                count: self.store.count(&key).await?,
                sources: self.store.list_sources(&key).await?,
            })
        }
        .await;
        Reply::from_result(report)
    }

    /// Delete one source (by filename or video id) or, with no selector, the
    /// user's whole collection for the domain.
    pub async fn delete(&self, domain: Domain, user_id: &str, selector: Option<&str>) -> Reply {
        let key = CollectionKey::resolve(user_id, domain);
        let result = match selector {
            Some(source_id) => {
                match self.store.delete_by_source(&key, source_id).await {
                    Ok(0) => Err(MinneError::NotFound(format!(
                        "No {} content matching '{}'",
                        domain, source_id
                    ))),
                    Ok(deleted) => Ok(DeleteReport {
                        message: format!("Deleted '{}'", source_id),
                        deleted_count: deleted,
                    }),
                    Err(e) => Err(e),
                }
            }
            None => {
                let count = match self.store.count(&key).await {
                    Ok(count) => count,
                    Err(e) => return Reply::failure(&e),
                };
                self.store.delete_all(&key).await.map(|()| DeleteReport {
                    message: format!("Deleted all {} content", domain),
                    deleted_count: count,
                })
            }
        };
        Reply::from_result(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashedEmbedder;
    use crate::transcript::TranscriptEntry;
    use crate::vector_store::MemoryVectorStore;
    use crate::youtube::{FetchedTranscript, VideoMetadata};
    use async_trait::async_trait;

    struct FakeTranscripts;

    #[async_trait]
    impl TranscriptSource for FakeTranscripts {
        async fn fetch_transcript(
            &self,
            _video_id: &str,
            _language: &str,
        ) -> Result<FetchedTranscript> {
            Ok(FetchedTranscript {
                entries: vec![TranscriptEntry::new("a caption line", 0.0, 4.0)],
                language: "en".to_string(),
            })
        }
    }

    struct FakeMetadata;

    #[async_trait]
    impl MetadataSource for FakeMetadata {
        async fn fetch_metadata(&self, video_id: &str) -> Result<VideoMetadata> {
            Ok(VideoMetadata::placeholder(video_id))
        }
    }

    struct FakeGenerator;

    #[async_trait]
    impl Generator for FakeGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Ok("a generated answer".to_string())
        }

        fn model(&self) -> &str {
            "fake"
        }
    }

    fn service(generator: Option<Arc<dyn Generator>>) -> MinneService {
        MinneService::new(
            &Settings::default(),
            Prompts::default(),
            Arc::new(HashedEmbedder::new(64)),
            Arc::new(MemoryVectorStore::new()),
            generator,
            Arc::new(FakeTranscripts),
            Arc::new(FakeMetadata),
        )
    }

    fn document_text() -> String {
        (0..60)
            .map(|i| format!("Paragraph {} describes a different aspect of beekeeping.", i))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    #[tokio::test]
    async fn test_query_without_content_fails_without_raising() {
        let service = service(Some(Arc::new(FakeGenerator)));

        let reply = service.query(Domain::Document, "u2", "anything?").await;
        assert!(!reply.success);
        assert!(reply.error.unwrap().contains("No content"));
    }

    #[tokio::test]
    async fn test_ingest_then_query_cites_the_file() {
        let service = service(Some(Arc::new(FakeGenerator)));

        let text = document_text();
        assert!(text.chars().count() >= 3000);
        let reply = service.ingest_document(&text, "u1", "A.txt").await;
        assert!(reply.success);
        let chunks = reply.data["chunks_count"].as_u64().unwrap();
        assert!(chunks >= 3);

        let reply = service
            .query(Domain::Document, "u1", "what is this document about?")
            .await;
        assert!(reply.success);
        let citations = reply.data["citations"].as_array().unwrap();
        assert!(!citations.is_empty());
        assert!(citations.iter().any(|c| c["filename"] == "A.txt"));
    }

    #[tokio::test]
    async fn test_delete_source_then_info_excludes_it() {
        let service = service(None);

        let ingest = service.ingest_document(&document_text(), "u1", "A.txt").await;
        let a_chunks = ingest.data["chunks_count"].as_u64().unwrap() as usize;
        service
            .ingest_document("A short note about ferns.", "u1", "B.txt")
            .await;

        let info = service.info(Domain::Document, "u1").await;
        let before = info.data["count"].as_u64().unwrap() as usize;

        let reply = service.delete(Domain::Document, "u1", Some("A.txt")).await;
        assert!(reply.success);
        assert_eq!(reply.data["deleted_count"].as_u64().unwrap() as usize, a_chunks);

        let info = service.info(Domain::Document, "u1").await;
        assert_eq!(info.data["count"].as_u64().unwrap() as usize, before - a_chunks);
        let sources = info.data["sources"].as_array().unwrap();
        assert!(sources.iter().all(|s| s["content_id"] != "A.txt"));
        assert!(sources.iter().any(|s| s["content_id"] == "B.txt"));
    }

    #[tokio::test]
    async fn test_delete_unknown_selector_reports_not_found() {
        let service = service(None);
        service
            .ingest_document("Some content to make the collection exist.", "u1", "A.txt")
            .await;

        let reply = service.delete(Domain::Document, "u1", Some("missing.txt")).await;
        assert!(!reply.success);
        assert!(reply.error.unwrap().contains("missing.txt"));
    }

    #[tokio::test]
    async fn test_delete_all_on_absent_collection_succeeds() {
        let service = service(None);

        let reply = service.delete(Domain::Video, "nobody", None).await;
        assert!(reply.success);
        assert_eq!(reply.data["deleted_count"].as_u64(), Some(0));
    }

    #[tokio::test]
    async fn test_query_without_generator_short_circuits() {
        let service = service(None);
        service
            .ingest_document("Enough content to query against.", "u1", "A.txt")
            .await;

        let reply = service.query(Domain::Document, "u1", "anything?").await;
        assert!(!reply.success);
        assert!(reply.error.unwrap().contains("unavailable"));
    }

    #[tokio::test]
    async fn test_video_ingest_reply_includes_video_data() {
        let service = service(None);

        let reply = service.ingest_video("dQw4w9WgXcQ", "u1", "en").await;
        assert!(reply.success);
        assert_eq!(reply.data["video_data"]["video_id"], "dQw4w9WgXcQ");

        let info = service.info(Domain::Video, "u1").await;
        assert!(info.data["count"].as_u64().unwrap() >= 1);
    }

    #[tokio::test]
    async fn test_users_are_isolated() {
        let service = service(None);
        service
            .ingest_document("Private notes for user one.", "u1", "secret.txt")
            .await;

        let info = service.info(Domain::Document, "u2").await;
        assert_eq!(info.data["count"].as_u64(), Some(0));
        assert!(info.data["sources"].as_array().unwrap().is_empty());
    }
}
