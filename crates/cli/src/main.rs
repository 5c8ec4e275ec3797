//! DocChat CLI — the main entry point.
//!
//! Commands:
//! - `onboard`    — Write the default config file
//! - `extract`    — Print the text extracted from documents
//! - `ask`        — Ask one question about documents
//! - `summarize`  — Summarize documents
//! - `chat`       — Interactive question-answer session

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "docchat",
    about = "DocChat — chat with your PDF, Word and Excel documents",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the configuration file
    Onboard,

    /// Extract and print the document context
    Extract {
        /// Documents to read (.pdf, .docx, .xlsx, ...)
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Ask a single question about the documents
    Ask {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// The question to ask
        #[arg(short, long)]
        question: String,
    },

    /// Summarize the documents
    Summarize {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Chat about the documents interactively
    Chat {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Extract { files } => commands::extract::run(files).await?,
        Commands::Ask { files, question } => commands::ask::run(files, question).await?,
        Commands::Summarize { files } => commands::summarize::run(files).await?,
        Commands::Chat { files } => commands::chat::run(files).await?,
    }

    Ok(())
}
