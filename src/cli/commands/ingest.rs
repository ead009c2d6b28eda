//! Ingestion commands: documents, videos, and pasted transcripts.

use crate::cli::commands::build_service;
use crate::cli::Output;
use crate::config::Settings;
use anyhow::{anyhow, Result};
use std::io::Read;
use std::path::Path;

/// Ingest a plain-text file as a document.
pub async fn run_ingest_doc(
    file: &str,
    name: Option<String>,
    user: &str,
    settings: &Settings,
) -> Result<()> {
    let path = Path::new(file);
    let text = std::fs::read_to_string(path)?;
    let filename = name.unwrap_or_else(|| {
        path.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| file.to_string())
    });

    let service = build_service(settings, false).await?;
    let reply = service.ingest_document(&text, user, &filename).await;

    if reply.success {
        Output::success(reply.data["message"].as_str().unwrap_or("Done"));
        Ok(())
    } else {
        let error = reply.error.unwrap_or_else(|| "Unknown error".to_string());
        Output::error(&error);
        Err(anyhow!(error))
    }
}

/// Ingest a YouTube video's captions.
pub async fn run_ingest_video(
    input: &str,
    language: &str,
    user: &str,
    settings: &Settings,
) -> Result<()> {
    let service = build_service(settings, false).await?;

    Output::info(&format!("Fetching captions for {}", input));
    let reply = service.ingest_video(input, user, language).await;

    if reply.success {
        Output::success(reply.data["message"].as_str().unwrap_or("Done"));
        let data = &reply.data["video_data"];
        Output::kv("Video", data["video_id"].as_str().unwrap_or("?"));
        Output::kv("Channel", data["channel"].as_str().unwrap_or("?"));
        Output::kv("Language", data["language"].as_str().unwrap_or("?"));
        Ok(())
    } else {
        let error = reply.error.unwrap_or_else(|| "Unknown error".to_string());
        Output::error(&error);
        Err(anyhow!(error))
    }
}

/// Ingest a pasted transcript from a file or stdin.
pub async fn run_ingest_transcript(
    file: Option<&str>,
    title: Option<String>,
    url: Option<String>,
    user: &str,
    settings: &Settings,
) -> Result<()> {
    let text = match file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let service = build_service(settings, false).await?;
    let reply = service
        .ingest_pasted_transcript(&text, user, title.as_deref(), url.as_deref())
        .await;

    if reply.success {
        Output::success(reply.data["message"].as_str().unwrap_or("Done"));
        Output::kv(
            "Stored as",
            reply.data["video_data"]["video_id"].as_str().unwrap_or("?"),
        );
        Ok(())
    } else {
        let error = reply.error.unwrap_or_else(|| "Unknown error".to_string());
        Output::error(&error);
        Err(anyhow!(error))
    }
}
