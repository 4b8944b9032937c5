//! Search command handler.

use clap::Args;
use knowqa_core::config::AppConfig;
use knowqa_knowledge::OpenMode;

/// Show the chunks closest to a query
#[derive(Args, Debug)]
pub struct SearchCommand {
    /// Query text
    pub query: String,

    /// Number of chunks to return
    #[arg(short = 'k', long, default_value = "5")]
    pub top_k: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

const PREVIEW_CHARS: usize = 200;

impl SearchCommand {
    pub async fn execute(&self, config: &AppConfig) -> anyhow::Result<()> {
        tracing::info!("Executing search command (top_k: {})", self.top_k);

        let engine = super::open_engine(config, OpenMode::LoadOrCreate)?;
        let hits = engine.search(&self.query, self.top_k).await?;

        if self.json {
            return super::print_json(&hits);
        }

        if hits.is_empty() {
            println!("No results (the index is empty).");
            return Ok(());
        }

        for hit in &hits {
            println!(
                "{}. {} (similarity {:.4}, distance {:.4})",
                hit.rank, hit.filename, hit.similarity, hit.distance
            );
            println!("   {}", preview(&hit.content));
        }

        Ok(())
    }
}

fn preview(content: &str) -> String {
    if content.chars().count() <= PREVIEW_CHARS {
        return content.to_string();
    }
    let cut: String = content.chars().take(PREVIEW_CHARS).collect();
    format!("{}...", cut.trim_end())
}
