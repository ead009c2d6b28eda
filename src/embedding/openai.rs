//! OpenAI embeddings implementation.

use super::Embedder;
use crate::config::EmbeddingSettings;
use crate::error::{MinneError, Result};
use crate::openai::create_client;
use async_openai::types::{CreateEmbeddingRequestArgs, EmbeddingInput};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// OpenAI-based embedder.
pub struct OpenAIEmbedder {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    dimensions: usize,
}

impl OpenAIEmbedder {
    /// Construct from settings. Fails when no API key is configured, which
    /// lets the provider selection move on to the fallback.
    pub fn try_new(settings: &EmbeddingSettings) -> Result<Self> {
        Ok(Self {
            client: create_client(&settings.api_key_env, None)?,
            model: settings.model.clone(),
            dimensions: settings.dimensions as usize,
        })
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Generating embeddings for {} texts", texts.len());

        // The API limits batch size, process in chunks.
        const BATCH_SIZE: usize = 100;
        let mut all_embeddings = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(BATCH_SIZE) {
            let request = CreateEmbeddingRequestArgs::default()
                .model(&self.model)
                .input(EmbeddingInput::StringArray(chunk.to_vec()))
                .dimensions(self.dimensions as u32)
                .build()
                .map_err(|e| MinneError::Embedding(format!("Failed to build request: {}", e)))?;

            let response = self
                .client
                .embeddings()
                .create(request)
                .await
                .map_err(|e| MinneError::Upstream(format!("Embedding API error: {}", e)))?;

            // Sort by index to ensure correct order.
            let mut embeddings: Vec<_> = response.data.into_iter().collect();
            embeddings.sort_by_key(|e| e.index);

            for embedding_data in embeddings {
                all_embeddings.push(embedding_data.embedding);
            }
        }

        debug!("Generated {} embeddings", all_embeddings.len());
        Ok(all_embeddings)
    }

    #[instrument(skip(self, text))]
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let embeddings = self.embed(&[text.to_string()]).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| MinneError::Embedding("Empty embedding response".to_string()))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
