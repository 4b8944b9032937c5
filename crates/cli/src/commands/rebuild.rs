//! Rebuild command handler.

use clap::Args;
use knowqa_core::config::AppConfig;
use knowqa_knowledge::OpenMode;

/// Rebuild the index from the uploads directory
#[derive(Args, Debug)]
pub struct RebuildCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl RebuildCommand {
    pub async fn execute(&self, config: &AppConfig) -> anyhow::Result<()> {
        tracing::info!("Executing rebuild command");

        let engine = super::open_engine(config, OpenMode::Fresh)?;
        let report = engine.rebuild().await?;

        if self.json {
            return super::print_json(&report);
        }

        println!(
            "Rebuilt index with {} documents ({} chunks) in {:.2}s",
            report.documents, report.chunks, report.duration_secs
        );
        for skipped in &report.skipped {
            println!("  skipped {} (empty or not UTF-8)", skipped);
        }

        Ok(())
    }
}
