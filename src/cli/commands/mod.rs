//! Command implementations.

mod ask;
mod delete;
mod info;
mod ingest;

pub use ask::run_ask;
pub use delete::run_delete;
pub use info::run_info;
pub use ingest::{run_ingest_doc, run_ingest_transcript, run_ingest_video};

use crate::cli::Output;
use crate::config::{Prompts, Settings};
use crate::embedding::select_embedder;
use crate::generation::select_generator;
use crate::service::MinneService;
use crate::vector_store::{MemoryVectorStore, SqliteVectorStore, VectorStore};
use crate::youtube::YtDlpSource;
use anyhow::Result;
use std::sync::Arc;

/// Assemble the service from configuration.
///
/// The generation backend is only probed for commands that answer questions;
/// ingestion and maintenance never touch it.
pub async fn build_service(settings: &Settings, with_generator: bool) -> Result<MinneService> {
    let embedder = select_embedder(&settings.embedding);

    let store: Arc<dyn VectorStore> = match settings.vector_store.provider.as_str() {
        "memory" => Arc::new(MemoryVectorStore::new()),
        _ => Arc::new(SqliteVectorStore::new(&settings.sqlite_path())?),
    };

    let generator = if with_generator {
        match select_generator(&settings.generation).await {
            Ok(generator) => Some(generator),
            Err(e) => {
                Output::warning(&format!("Generation unavailable: {}", e));
                None
            }
        }
    } else {
        None
    };

    let prompts = Prompts::load(settings.prompts.custom_dir.as_deref())?;
    let source = Arc::new(YtDlpSource::new());

    Ok(MinneService::new(
        settings,
        prompts,
        embedder,
        store,
        generator,
        source.clone(),
        source,
    ))
}
