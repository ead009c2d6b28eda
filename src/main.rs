//! Minne CLI entry point.

use anyhow::Result;
use clap::Parser;
use minne::cli::{commands, Cli, Commands};
use minne::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("minne={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    // Ensure data directories exist
    std::fs::create_dir_all(settings.data_dir())?;

    // Execute command
    match &cli.command {
        Commands::IngestDoc { file, name } => {
            commands::run_ingest_doc(file, name.clone(), &cli.user, &settings).await?;
        }

        Commands::IngestVideo { input, language } => {
            commands::run_ingest_video(input, language, &cli.user, &settings).await?;
        }

        Commands::IngestTranscript { file, title, url } => {
            commands::run_ingest_transcript(
                file.as_deref(),
                title.clone(),
                url.clone(),
                &cli.user,
                &settings,
            )
            .await?;
        }

        Commands::Ask { question, domain } => {
            commands::run_ask(question, *domain, &cli.user, &settings).await?;
        }

        Commands::Info { domain } => {
            commands::run_info(*domain, &cli.user, &settings).await?;
        }

        Commands::Delete { domain, selector } => {
            commands::run_delete(*domain, selector.as_deref(), &cli.user, &settings).await?;
        }
    }

    Ok(())
}
