//! Documents command handler.

use clap::Args;
use knowqa_core::config::AppConfig;
use knowqa_knowledge::{DirectorySource, DocumentSource};

/// List uploaded documents
#[derive(Args, Debug)]
pub struct DocumentsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl DocumentsCommand {
    pub fn execute(&self, config: &AppConfig) -> anyhow::Result<()> {
        tracing::info!("Executing documents command");

        let source = DirectorySource::new(
            config.uploads_dir(),
            config.retrieval.document_extension.clone(),
        );
        let documents = source.list_documents()?;

        if self.json {
            return super::print_json(&serde_json::json!({
                "documents": documents,
                "count": documents.len(),
            }));
        }

        if documents.is_empty() {
            println!("No documents uploaded.");
        } else {
            for doc in &documents {
                println!("{}  ({} bytes)", doc.filename, doc.size_bytes);
            }
            println!("{} documents", documents.len());
        }

        Ok(())
    }
}
