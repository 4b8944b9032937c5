//! Command handlers for the knowqa CLI.

pub mod ask;
pub mod clear;
pub mod delete;
pub mod documents;
pub mod rebuild;
pub mod search;
pub mod status;
pub mod upload;

pub use ask::AskCommand;
pub use clear::ClearCommand;
pub use delete::DeleteCommand;
pub use documents::DocumentsCommand;
pub use rebuild::RebuildCommand;
pub use search::SearchCommand;
pub use status::StatusCommand;
pub use upload::UploadCommand;

use anyhow::Context;
use knowqa_core::config::AppConfig;
use knowqa_knowledge::{OpenMode, RetrievalEngine};

/// Open the retrieval engine for the configured workspace.
pub(crate) fn open_engine(config: &AppConfig, mode: OpenMode) -> anyhow::Result<RetrievalEngine> {
    RetrievalEngine::from_config(config, mode).context("Failed to open the vector store")
}

/// Print `value` as pretty JSON on stdout.
pub(crate) fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
