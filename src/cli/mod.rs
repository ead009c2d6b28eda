//! CLI module for Minne.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Minne - Personal Document and Video Q&A
///
/// Ingest your notes and video transcripts into a per-user knowledge base and
/// ask questions against them. The name "Minne" comes from the Norwegian word
/// for "memory."
#[derive(Parser, Debug)]
#[command(name = "minne")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// User identifier owning the content
    #[arg(short, long, global = true, default_value = "default")]
    pub user: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ingest a plain-text document file
    IngestDoc {
        /// Path to the text file
        file: String,

        /// Name to store the document under (defaults to the file name)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Ingest a YouTube video's captions
    IngestVideo {
        /// YouTube URL or bare 11-character video id
        input: String,

        /// Preferred caption language
        #[arg(short, long, default_value = "en")]
        language: String,
    },

    /// Ingest a manually pasted transcript from a file or stdin
    IngestTranscript {
        /// Path to the transcript file; omit to read stdin
        file: Option<String>,

        /// Title for the transcript
        #[arg(short, long)]
        title: Option<String>,

        /// Source URL, if known
        #[arg(long)]
        url: Option<String>,
    },

    /// Ask a question over ingested content
    Ask {
        /// The question to ask
        question: String,

        /// Content domain to query (document or video)
        #[arg(short, long, default_value = "document")]
        domain: crate::vector_store::Domain,
    },

    /// Show what is stored for a user
    Info {
        /// Content domain to inspect (document or video)
        #[arg(short, long, default_value = "document")]
        domain: crate::vector_store::Domain,
    },

    /// Delete one source or a whole domain's content
    Delete {
        /// Content domain to delete from (document or video)
        #[arg(short, long, default_value = "document")]
        domain: crate::vector_store::Domain,

        /// Filename or video id to delete; omit to delete everything
        selector: Option<String>,
    },
}
