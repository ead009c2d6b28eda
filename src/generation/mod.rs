//! Answer generation against an OpenAI-compatible chat API.
//!
//! The configured candidate models are tried once at startup; the first that
//! answers a probe completion becomes the active generator for the process.

use crate::config::GenerationSettings;
use crate::error::{MinneError, Result};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Trait for the text-generation capability.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate a completion for a fully rendered prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// The active model name.
    fn model(&self) -> &str;
}

/// Chat-completion generator for OpenAI-compatible endpoints (Groq, OpenAI).
pub struct ChatGenerator {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl ChatGenerator {
    pub fn new(settings: &GenerationSettings, model: &str) -> Result<Self> {
        Ok(Self {
            client: create_client(&settings.api_key_env, Some(&settings.api_base))?,
            model: model.to_string(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        })
    }
}

#[async_trait]
impl Generator for ChatGenerator {
    #[instrument(skip(self, prompt), fields(model = %self.model))]
    async fn generate(&self, prompt: &str) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> =
            vec![ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|e| MinneError::Generation(e.to_string()))?
                .into()];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .max_completion_tokens(self.max_tokens)
            .build()
            .map_err(|e| MinneError::Generation(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| MinneError::Upstream(format!("Generation API error: {}", e)))?;

        response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .map(|s| s.trim().to_string())
            .ok_or_else(|| MinneError::Generation("Empty response from model".to_string()))
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Try the configured candidate models in order, probing each with a tiny
/// completion. The first responsive model is retained.
pub async fn select_generator(settings: &GenerationSettings) -> Result<Arc<dyn Generator>> {
    for model in &settings.models {
        let generator = match ChatGenerator::new(settings, model) {
            Ok(g) => g,
            Err(e) => return Err(e),
        };

        match generator.generate("Hello").await {
            Ok(_) => {
                info!(model = %model, "Selected generation model");
                return Ok(Arc::new(generator));
            }
            Err(e) => {
                warn!(model = %model, "Model probe failed: {}", e);
            }
        }
    }

    Err(MinneError::Upstream(
        "No generation model available; all candidates failed their probe".to_string(),
    ))
}
