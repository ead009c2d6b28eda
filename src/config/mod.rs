//! Configuration management for Minne.

mod prompts;
mod settings;

pub use prompts::{Prompts, RagPrompts};
pub use settings::{
    ChunkingSettings, EmbeddingSettings, GenerationSettings, GeneralSettings, PromptSettings,
    RagSettings, Settings, VectorStoreSettings,
};
