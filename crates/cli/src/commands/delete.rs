//! Delete command handler.

use clap::Args;
use knowqa_core::config::AppConfig;
use knowqa_knowledge::OpenMode;

/// Delete a document and rebuild the index
#[derive(Args, Debug)]
pub struct DeleteCommand {
    /// Name of the uploaded document
    pub filename: String,
}

impl DeleteCommand {
    pub async fn execute(&self, config: &AppConfig) -> anyhow::Result<()> {
        tracing::info!("Executing delete command for {}", self.filename);

        // The index is rebuilt from scratch, so a stale one need not load.
        let engine = super::open_engine(config, OpenMode::Fresh)?;
        let report = engine.delete_document(&self.filename).await?;

        println!(
            "Deleted {}; index rebuilt with {} documents ({} chunks)",
            self.filename, report.documents, report.chunks
        );

        Ok(())
    }
}
