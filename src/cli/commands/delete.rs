//! Delete command implementation.

use crate::cli::commands::build_service;
use crate::cli::Output;
use crate::config::Settings;
use crate::vector_store::Domain;
use anyhow::{anyhow, Result};

/// Delete one source, or everything in a domain when no selector is given.
pub async fn run_delete(
    domain: Domain,
    selector: Option<&str>,
    user: &str,
    settings: &Settings,
) -> Result<()> {
    let service = build_service(settings, false).await?;

    let reply = service.delete(domain, user, selector).await;
    if !reply.success {
        let error = reply.error.unwrap_or_else(|| "Unknown error".to_string());
        Output::error(&error);
        return Err(anyhow!(error));
    }

    Output::success(reply.data["message"].as_str().unwrap_or("Deleted"));
    Output::kv(
        "Chunks removed",
        &reply.data["deleted_count"].as_u64().unwrap_or(0).to_string(),
    );

    Ok(())
}
