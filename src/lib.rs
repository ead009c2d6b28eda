//! Minne - Personal Document and Video Q&A
//!
//! A per-user knowledge base over uploaded notes and video transcripts,
//! with retrieval-augmented question answering.
//!
//! The name "Minne" comes from the Norwegian word for "memory."
//!
//! # Overview
//!
//! Minne allows you to:
//! - Ingest plain-text documents, YouTube captions, and pasted transcripts
//! - Keep each user's content in its own isolated collection
//! - Ask questions and get answers with citations back to the source
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration and prompt templates
//! - `segmenter` - Recursive text segmentation with overlap
//! - `transcript` - Timestamped transcript windowing
//! - `embedding` - Embedding generation with a deterministic fallback
//! - `vector_store` - Per-user vector collection abstraction
//! - `youtube` - Video id extraction, metadata, and caption fetching
//! - `generation` - Answer generation with ordered model fallback
//! - `ingest` - Ingestion pipeline for all content types
//! - `rag` - Retrieval-augmented answering with citations
//! - `service` - The operation boundary a transport layer calls
//!
//! # Example
//!
//! ```rust,no_run
//! use minne::config::{Prompts, Settings};
//! use minne::service::MinneService;
//! use minne::vector_store::Domain;
//! # use minne::embedding::HashedEmbedder;
//! # use minne::vector_store::MemoryVectorStore;
//! # use minne::youtube::YtDlpSource;
//! # use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let source = Arc::new(YtDlpSource::new());
//!     let service = MinneService::new(
//!         &settings,
//!         Prompts::default(),
//!         Arc::new(HashedEmbedder::new(384)),
//!         Arc::new(MemoryVectorStore::new()),
//!         None,
//!         source.clone(),
//!         source,
//!     );
//!
//!     let reply = service
//!         .ingest_document("Some notes about sailing.", "u1", "sailing.txt")
//!         .await;
//!     println!("Stored {} chunks", reply.data["chunks_count"]);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod ingest;
pub mod openai;
pub mod rag;
pub mod segmenter;
pub mod service;
pub mod transcript;
pub mod vector_store;
pub mod youtube;

pub use error::{MinneError, Result};
