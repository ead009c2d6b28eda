//! Prompt templates for Minne.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub rag: RagPrompts,
}

/// Prompts for RAG answer generation.
///
/// Templates carry `{{context}}` and `{{question}}` slots filled at query time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagPrompts {
    /// Template used when answering over uploaded documents.
    pub document: String,
    /// Template used when answering over video transcripts.
    pub video: String,
}

impl Default for RagPrompts {
    fn default() -> Self {
        Self {
            document: r#"Use the following pieces of context to answer the question at the end.
If you don't know the answer based on the provided context, just say "I don't have enough information in the provided notes to answer this question."

Context: {{context}}

Question: {{question}}

Answer: "#
                .to_string(),

            video: r#"Use the video transcript context to answer the question.
If you don't know based on the video, say so.

Context: {{context}}
Question: {{question}}
Answer: "#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from defaults, applying overrides from a custom directory.
    pub fn load(custom_dir: Option<&str>) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let rag_path = custom_path.join("rag.toml");
            if rag_path.exists() {
                let content = std::fs::read_to_string(&rag_path)?;
                prompts.rag = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }
}
