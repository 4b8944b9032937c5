//! Upload command handler.

use clap::Args;
use knowqa_core::config::AppConfig;
use knowqa_knowledge::OpenMode;
use std::path::PathBuf;

/// Upload .txt documents and index them
#[derive(Args, Debug)]
pub struct UploadCommand {
    /// Files to upload
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl UploadCommand {
    pub async fn execute(&self, config: &AppConfig) -> anyhow::Result<()> {
        tracing::info!("Executing upload command for {} files", self.files.len());

        let engine = super::open_engine(config, OpenMode::LoadOrCreate)?;
        let mut reports = Vec::with_capacity(self.files.len());

        for path in &self.files {
            let filename = path
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| anyhow::anyhow!("Invalid filename: {}", path.display()))?;
            let bytes = std::fs::read(path)
                .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;

            let report = engine
                .upload(filename, &bytes)
                .await
                .map_err(|e| anyhow::anyhow!("Upload of {} failed: {}", filename, e))?;

            if !self.json {
                let verb = if report.replaced { "Replaced" } else { "Uploaded" };
                println!(
                    "{} {} ({} characters, {} chunks)",
                    verb, report.filename, report.size, report.chunks
                );
            }
            reports.push(report);
        }

        if self.json {
            super::print_json(&reports)?;
        }

        Ok(())
    }
}
