//! Clear command handler.

use clap::Args;
use knowqa_core::config::AppConfig;
use knowqa_knowledge::OpenMode;

/// Remove everything from the index
#[derive(Args, Debug)]
pub struct ClearCommand {}

impl ClearCommand {
    pub async fn execute(&self, config: &AppConfig) -> anyhow::Result<()> {
        tracing::info!("Executing clear command");

        let engine = super::open_engine(config, OpenMode::Fresh)?;
        engine.clear().await?;

        println!("Index cleared. Uploaded documents were kept; run `knowqa rebuild` to re-index them.");

        Ok(())
    }
}
