//! Retrieval-augmented answering.
//!
//! A question is embedded, matched against the caller's collection, and the
//! retrieved chunks are rendered into a prompt template for the generator.
//! Citations point back at every retrieved chunk in ranked order.

mod context;

pub use context::{join_context, select_within_budget};

use crate::config::{Prompts, RagSettings};
use crate::embedding::Embedder;
use crate::error::{MinneError, Result};
use crate::generation::Generator;
use crate::vector_store::{Chunk, CollectionKey, Domain, VectorStore};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// One citation per retrieved chunk. Chunks from the same source each get
/// their own citation so multiple excerpts stay visible.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Citation {
    Document {
        filename: String,
        content_preview: String,
    },
    Video {
        video_title: String,
        channel: String,
        youtube_url: Option<String>,
        /// Chunk start offset as mm:ss.
        timestamp: String,
        content_preview: String,
    },
}

impl Citation {
    fn from_chunk(chunk: &Chunk) -> Self {
        match chunk.domain {
            Domain::Document => Citation::Document {
                filename: chunk.source_id.clone(),
                content_preview: chunk.preview(),
            },
            Domain::Video => Citation::Video {
                video_title: chunk.title.clone(),
                channel: chunk.channel.clone().unwrap_or_else(|| "Unknown".to_string()),
                youtube_url: chunk.source_url.clone(),
                timestamp: chunk.format_timestamp(),
                content_preview: chunk.preview(),
            },
        }
    }
}

/// A generated answer with its supporting citations.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerRecord {
    pub question: String,
    pub answer_text: String,
    pub citations: Vec<Citation>,
    pub success: bool,
}

/// Answers questions over one collection at a time.
pub struct RetrievalAnswerer {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    generator: Arc<dyn Generator>,
    prompts: Prompts,
    top_k: usize,
    max_context_chars: usize,
}

impl RetrievalAnswerer {
    pub fn new(
        settings: &RagSettings,
        prompts: Prompts,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        generator: Arc<dyn Generator>,
    ) -> Self {
        Self {
            embedder,
            store,
            generator,
            prompts,
            top_k: settings.top_k,
            max_context_chars: settings.max_context_chars,
        }
    }

    /// Answer a question against the given collection.
    #[instrument(skip(self, question), fields(collection = %key))]
    pub async fn answer(
        &self,
        key: &CollectionKey,
        domain: Domain,
        question: &str,
    ) -> Result<AnswerRecord> {
        if self.store.count(key).await? == 0 {
            return Err(MinneError::NoContent);
        }

        let query_embedding = self.embedder.embed_query(question).await?;
        let results = self.store.query(key, &query_embedding, self.top_k).await?;

        let selected = select_within_budget(&results, self.max_context_chars);
        debug!(
            retrieved = results.len(),
            in_context = selected.len(),
            "Assembled answer context"
        );
        let context = join_context(&selected);

        let template = match domain {
            Domain::Document => &self.prompts.rag.document,
            Domain::Video => &self.prompts.rag.video,
        };
        let mut vars = HashMap::new();
        vars.insert("context".to_string(), context);
        vars.insert("question".to_string(), question.to_string());
        let prompt = Prompts::render(template, &vars);

        let answer_text = self.generator.generate(&prompt).await?;

        let citations = results.iter().map(|r| Citation::from_chunk(&r.chunk)).collect();

        Ok(AnswerRecord {
            question: question.to_string(),
            answer_text,
            citations,
            success: true,
        })
    }
}
