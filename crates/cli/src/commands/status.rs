//! Status command handler.

use anyhow::Context;
use clap::Args;
use knowqa_core::config::AppConfig;
use knowqa_core::AppError;
use knowqa_knowledge::{
    DirectorySource, DocumentSource, IndexStats, IndexStore, OpenMode, RetrievalEngine,
    SynthesisStatus,
};

/// Show index, uploads and LLM status
#[derive(Args, Debug)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Vector store state as seen by the configured embedder.
#[derive(Debug)]
struct IndexReport {
    stats: IndexStats,
    /// Set when the persisted index was built by another embedder.
    mismatch: Option<String>,
}

/// Open the index, reporting an embedder mismatch instead of failing on it.
async fn index_report(config: &AppConfig) -> anyhow::Result<IndexReport> {
    match RetrievalEngine::from_config(config, OpenMode::LoadOrCreate) {
        Ok(engine) => Ok(IndexReport {
            stats: engine.stats().await,
            mismatch: None,
        }),
        Err(e @ (AppError::DimensionMismatch { .. } | AppError::EmbeddingModelMismatch { .. })) => {
            tracing::warn!("Persisted index does not match the configured embedder: {}", e);
            let store = IndexStore::new(config.vector_store_dir());
            let stats = match store.load()? {
                Some(state) => state.stats(store.exists()),
                None => IndexStats {
                    total_chunks: 0,
                    total_documents: 0,
                    dimension: config.embedding.dimensions,
                    index_exists: store.exists(),
                },
            };
            Ok(IndexReport {
                stats,
                mismatch: Some(e.to_string()),
            })
        }
        Err(e) => Err(e).context("Failed to open the vector store"),
    }
}

impl StatusCommand {
    pub async fn execute(&self, config: &AppConfig) -> anyhow::Result<()> {
        tracing::info!("Executing status command");

        let index = index_report(config).await?;
        let stats = &index.stats;

        let uploads_dir = config.uploads_dir();
        let uploads_exist = uploads_dir.is_dir();
        let file_count = DirectorySource::new(&uploads_dir, config.retrieval.document_extension.clone())
            .list_eligible()?
            .len();

        let synthesis = SynthesisStatus::from_config(config)?;
        let provider_label = synthesis
            .provider()
            .map(|p| p.display_name())
            .unwrap_or("none");

        if self.json {
            return super::print_json(&serde_json::json!({
                "status": if index.mismatch.is_some() { "degraded" } else { "healthy" },
                "llm": {
                    "provider": provider_label,
                    "model": config.llm.model,
                    "status": synthesis.as_str(),
                },
                "embedding": {
                    "provider": config.embedding.provider,
                    "model": config.embedding.model,
                    "dimensions": config.embedding.dimensions,
                },
                "vectorStore": {
                    "exists": stats.index_exists,
                    "totalChunks": stats.total_chunks,
                    "totalDocuments": stats.total_documents,
                    "dimension": stats.dimension,
                    "compatible": index.mismatch.is_none(),
                    "error": index.mismatch,
                },
                "uploadsDirectory": {
                    "path": uploads_dir,
                    "exists": uploads_exist,
                    "fileCount": file_count,
                },
            }));
        }

        println!("LLM: {} / {} ({})", provider_label, config.llm.model, synthesis.as_str());
        println!(
            "Embedding: {} / {} ({} dims)",
            config.embedding.provider, config.embedding.model, config.embedding.dimensions
        );
        println!("Vector store: {}", config.vector_store_dir().display());
        println!("  Exists: {}", stats.index_exists);
        println!("  Chunks: {}", stats.total_chunks);
        println!("  Documents: {}", stats.total_documents);
        println!("  Dimension: {}", stats.dimension);
        if let Some(mismatch) = &index.mismatch {
            println!("  Incompatible: {}", mismatch);
        }
        println!("Uploads: {}", uploads_dir.display());
        println!("  Exists: {}", uploads_exist);
        println!("  Files: {}", file_count);

        Ok(())
    }
}
