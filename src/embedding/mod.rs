//! Embedding generation for semantic retrieval.
//!
//! Two interchangeable providers: a learned model behind an OpenAI-compatible
//! API, and a deterministic hash-based fallback used when no API key is
//! configured. Both are pure functions of their input for a fixed
//! configuration; the fallback trades semantic fidelity for determinism.

mod hashed;
mod openai;

pub use hashed::HashedEmbedder;
pub use openai::OpenAIEmbedder;

use crate::config::EmbeddingSettings;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

/// Trait for embedding generation.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate embeddings for multiple texts, one vector per input.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Generate an embedding for a single query.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;

    /// Get the embedding dimensions.
    fn dimensions(&self) -> usize;
}

/// Select the embedding provider, trying learned variants in order and
/// falling back to the deterministic hashed embedder.
///
/// Each candidate is tried exactly once at construction; the first that
/// constructs successfully becomes the active provider for the process.
pub fn select_embedder(settings: &EmbeddingSettings) -> Arc<dyn Embedder> {
    if settings.provider == "openai" {
        match OpenAIEmbedder::try_new(settings) {
            Ok(embedder) => {
                info!(model = %settings.model, "Using OpenAI embeddings");
                return Arc::new(embedder);
            }
            Err(e) => {
                warn!("OpenAI embeddings unavailable ({}), using hashed fallback", e);
            }
        }
    }

    info!(
        dimensions = settings.fallback_dimensions,
        "Using deterministic hashed embeddings"
    );
    Arc::new(HashedEmbedder::new(settings.fallback_dimensions as usize))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_selected_without_api_key() {
        let settings = EmbeddingSettings {
            api_key_env: "MINNE_TEST_KEY_THAT_IS_NOT_SET".to_string(),
            ..EmbeddingSettings::default()
        };
        let embedder = select_embedder(&settings);
        assert_eq!(embedder.dimensions(), 384);
    }

    #[test]
    fn test_hashed_selected_when_configured() {
        let settings = EmbeddingSettings {
            provider: "hashed".to_string(),
            fallback_dimensions: 128,
            ..EmbeddingSettings::default()
        };
        let embedder = select_embedder(&settings);
        assert_eq!(embedder.dimensions(), 128);
    }
}
