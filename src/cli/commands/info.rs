//! Info command implementation.

use crate::cli::commands::build_service;
use crate::cli::Output;
use crate::config::Settings;
use crate::vector_store::Domain;
use anyhow::{anyhow, Result};

/// Show what a user has stored in one domain.
pub async fn run_info(domain: Domain, user: &str, settings: &Settings) -> Result<()> {
    let service = build_service(settings, false).await?;

    let reply = service.info(domain, user).await;
    if !reply.success {
        let error = reply.error.unwrap_or_else(|| "Unknown error".to_string());
        Output::error(&error);
        return Err(anyhow!(error));
    }

    let count = reply.data["count"].as_u64().unwrap_or(0);
    let sources = reply.data["sources"].as_array().cloned().unwrap_or_default();

    if sources.is_empty() {
        Output::info(&format!(
            "No {} content for '{}' yet. Use 'minne ingest-doc' or 'minne ingest-video' to add some.",
            domain, user
        ));
        return Ok(());
    }

    Output::header(&format!("Stored {} content ({} sources)", domain, sources.len()));
    println!();
    for source in &sources {
        Output::source(
            source["title"].as_str().unwrap_or("?"),
            source["content_id"].as_str().unwrap_or("?"),
            source["channel"].as_str(),
            source["chunk_count"].as_u64().unwrap_or(0) as u32,
        );
    }
    println!();
    Output::kv("Total chunks", &count.to_string());

    Ok(())
}
