//! Ask command implementation.

use crate::cli::commands::build_service;
use crate::cli::Output;
use crate::config::Settings;
use crate::vector_store::Domain;
use anyhow::{anyhow, Result};

/// Answer a question over the user's ingested content.
pub async fn run_ask(
    question: &str,
    domain: Domain,
    user: &str,
    settings: &Settings,
) -> Result<()> {
    let service = build_service(settings, true).await?;

    let reply = service.query(domain, user, question).await;
    if !reply.success {
        let error = reply.error.unwrap_or_else(|| "Unknown error".to_string());
        Output::error(&error);
        return Err(anyhow!(error));
    }

    println!("\n{}", reply.data["answer_text"].as_str().unwrap_or(""));

    if let Some(citations) = reply.data["citations"].as_array() {
        if !citations.is_empty() {
            Output::header("Sources");
            for (i, citation) in citations.iter().enumerate() {
                let label = match citation["type"].as_str() {
                    Some("video") => format!(
                        "{} ({}) @ {}",
                        citation["video_title"].as_str().unwrap_or("?"),
                        citation["channel"].as_str().unwrap_or("?"),
                        citation["timestamp"].as_str().unwrap_or("00:00"),
                    ),
                    _ => citation["filename"].as_str().unwrap_or("?").to_string(),
                };
                Output::citation(
                    i + 1,
                    &label,
                    citation["content_preview"].as_str().unwrap_or(""),
                    citation["youtube_url"].as_str(),
                );
            }
        }
    }

    Ok(())
}
