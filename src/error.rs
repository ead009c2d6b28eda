//! Error types for Minne.

use thiserror::Error;

/// Library-level error type for Minne operations.
#[derive(Error, Debug)]
pub enum MinneError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No captions available in '{requested}'. Available languages: {}", available.join(", "))]
    LanguageNotAvailable {
        requested: String,
        available: Vec<String>,
    },

    #[error("No content found. Ingest some notes or videos first.")]
    NoContent,

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Vector store error: {0}")]
    Storage(String),

    #[error("Upstream service unavailable: {0}")]
    Upstream(String),

    #[error("Video source error: {0}")]
    VideoSource(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Result type alias for Minne operations.
pub type Result<T> = std::result::Result<T, MinneError>;
