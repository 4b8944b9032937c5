//! knowqa CLI
//!
//! Upload plain-text documents and ask questions answered from them.

mod commands;

use anyhow::Context;
use clap::{Parser, Subcommand};
use commands::{
    AskCommand, ClearCommand, DeleteCommand, DocumentsCommand, RebuildCommand, SearchCommand,
    StatusCommand, UploadCommand,
};
use knowqa_core::{config::AppConfig, logging};
use std::path::PathBuf;

/// knowqa - question answering over your own text documents
#[derive(Parser, Debug)]
#[command(name = "knowqa")]
#[command(about = "Question answering over uploaded text documents", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "KNOWQA_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "KNOWQA_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// Answer-synthesis provider (gemini, ollama, none)
    #[arg(short, long, global = true, env = "KNOWQA_PROVIDER")]
    provider: Option<String>,

    /// Answer-synthesis model identifier
    #[arg(short, long, global = true, env = "KNOWQA_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Upload .txt documents and index them
    Upload(UploadCommand),

    /// Ask a question about the uploaded documents
    Ask(AskCommand),

    /// Show the chunks closest to a query
    Search(SearchCommand),

    /// List uploaded documents
    Documents(DocumentsCommand),

    /// Delete a document and rebuild the index
    Delete(DeleteCommand),

    /// Rebuild the index from the uploads directory
    Rebuild(RebuildCommand),

    /// Show index, uploads and LLM status
    Status(StatusCommand),

    /// Remove everything from the index
    Clear(ClearCommand),
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Upload(_) => "upload",
            Commands::Ask(_) => "ask",
            Commands::Search(_) => "search",
            Commands::Documents(_) => "documents",
            Commands::Delete(_) => "delete",
            Commands::Rebuild(_) => "rebuild",
            Commands::Status(_) => "status",
            Commands::Clear(_) => "clear",
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.workspace, cli.config)
        .context("Failed to load configuration")?
        .with_overrides(
            cli.provider,
            cli.model,
            cli.log_level,
            cli.verbose,
            cli.no_color,
        );

    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("knowqa starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!(
        "Embedding: {}/{} ({} dims), LLM: {}/{}",
        config.embedding.provider,
        config.embedding.model,
        config.embedding.dimensions,
        config.llm.provider,
        config.llm.model
    );

    config.validate()?;
    config.ensure_dirs()?;

    let _span = tracing::info_span!("command", name = cli.command.name()).entered();

    let result = match cli.command {
        Commands::Upload(cmd) => cmd.execute(&config).await,
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Search(cmd) => cmd.execute(&config).await,
        Commands::Documents(cmd) => cmd.execute(&config),
        Commands::Delete(cmd) => cmd.execute(&config).await,
        Commands::Rebuild(cmd) => cmd.execute(&config).await,
        Commands::Status(cmd) => cmd.execute(&config).await,
        Commands::Clear(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {:#}", e),
    }

    result
}
