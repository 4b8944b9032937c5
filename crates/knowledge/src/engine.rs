//! Retrieval engine.
//!
//! Owns the index state and coordinates chunking, embedding, search and
//! persistence. Searches share a read lock on the state. Mutating operations
//! are serialized by a separate writer gate and take the write lock only for
//! the append-and-save step, so embedding never blocks readers.

use crate::chunker::Chunker;
use crate::embeddings::{
    self, create_provider, EmbeddingConfig, EmbeddingProvider, EmbeddingSignature,
};
use crate::persistence::IndexStore;
use crate::sources::{validate_filename, DirectorySource, DocumentSource};
use crate::state::IndexState;
use crate::types::{DocumentInfo, IndexStats, RebuildReport, SearchHit, UploadReport};
use knowqa_core::{AppConfig, AppError, AppResult};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};

/// How to initialize the index state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Load the persisted index, or start empty if there is none.
    LoadOrCreate,
    /// Start empty without reading the persisted index.
    Fresh,
}

/// Tunables for a [`RetrievalEngine`].
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub chunk_size: usize,
    pub embed_timeout: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            chunk_size: crate::chunker::DEFAULT_CHUNK_SIZE,
            embed_timeout: Duration::from_secs(60),
        }
    }
}

impl From<&AppConfig> for EngineSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            chunk_size: config.retrieval.chunk_size,
            embed_timeout: Duration::from_secs(config.embedding.timeout_secs.max(1)),
        }
    }
}

pub struct RetrievalEngine {
    embedder: Arc<dyn EmbeddingProvider>,
    source: Arc<dyn DocumentSource>,
    store: IndexStore,
    chunker: Chunker,
    embed_timeout: Duration,
    state: RwLock<IndexState>,
    writer: Mutex<()>,
}

impl RetrievalEngine {
    /// Load the persisted index, or start empty when none is usable.
    ///
    /// Fails with [`AppError::DimensionMismatch`] or
    /// [`AppError::EmbeddingModelMismatch`] when the persisted index was
    /// built by another embedder.
    pub fn open(
        settings: EngineSettings,
        embedder: Arc<dyn EmbeddingProvider>,
        source: Arc<dyn DocumentSource>,
        store: IndexStore,
    ) -> AppResult<Self> {
        let signature = EmbeddingSignature::of(embedder.as_ref());
        let state = store
            .load_for(&signature)?
            .unwrap_or_else(|| IndexState::new(signature.dimensions));

        Ok(Self::with_state(settings, embedder, source, store, state))
    }

    /// Start with an empty index, ignoring anything persisted.
    pub fn fresh(
        settings: EngineSettings,
        embedder: Arc<dyn EmbeddingProvider>,
        source: Arc<dyn DocumentSource>,
        store: IndexStore,
    ) -> Self {
        let state = IndexState::new(embedder.dimensions());
        Self::with_state(settings, embedder, source, store, state)
    }

    /// Build an engine from application configuration.
    pub fn from_config(config: &AppConfig, mode: OpenMode) -> AppResult<Self> {
        let embedder = create_provider(&EmbeddingConfig::from(&config.embedding))?;
        let source: Arc<dyn DocumentSource> = Arc::new(DirectorySource::new(
            config.uploads_dir(),
            config.retrieval.document_extension.clone(),
        ));
        let store = IndexStore::new(config.vector_store_dir());
        let settings = EngineSettings::from(config);

        tracing::debug!(
            "Opening retrieval engine (embedder: {}/{}, dimension: {}, mode: {:?})",
            embedder.provider_name(),
            embedder.model_name(),
            embedder.dimensions(),
            mode
        );

        match mode {
            OpenMode::LoadOrCreate => Self::open(settings, embedder, source, store),
            OpenMode::Fresh => Ok(Self::fresh(settings, embedder, source, store)),
        }
    }

    fn with_state(
        settings: EngineSettings,
        embedder: Arc<dyn EmbeddingProvider>,
        source: Arc<dyn DocumentSource>,
        store: IndexStore,
        state: IndexState,
    ) -> Self {
        let store = store.with_embedder(EmbeddingSignature::of(embedder.as_ref()));
        Self {
            embedder,
            source,
            store,
            chunker: Chunker::new(settings.chunk_size),
            embed_timeout: settings.embed_timeout,
            state: RwLock::new(state),
            writer: Mutex::new(()),
        }
    }

    pub fn dimension(&self) -> usize {
        self.embedder.dimensions()
    }

    pub fn embedder(&self) -> &dyn EmbeddingProvider {
        self.embedder.as_ref()
    }

    pub fn store(&self) -> &IndexStore {
        &self.store
    }

    /// Chunk, embed and append one document, then persist.
    ///
    /// Returns the number of chunks added.
    pub async fn ingest(&self, filename: &str, content: &str) -> AppResult<usize> {
        let _gate = self.writer.lock().await;
        self.ingest_locked(filename, content).await
    }

    async fn ingest_locked(&self, filename: &str, content: &str) -> AppResult<usize> {
        if filename.trim().is_empty() {
            return Err(AppError::Input("Filename cannot be empty".to_string()));
        }
        if content.trim().is_empty() {
            return Err(AppError::Input(format!("Document {} is empty", filename)));
        }

        let chunks: Vec<String> = self.chunker.chunks(content).collect();
        let embeddings =
            embeddings::embed_texts(self.embedder.as_ref(), &chunks, self.embed_timeout).await?;
        let added = chunks.len();

        let mut state = self.state.write().await;
        let previous_len = state.len();
        state.append_document(filename, chunks, &embeddings)?;

        if let Err(e) = self.store.save(&state) {
            state.truncate(previous_len);
            tracing::error!("Failed to persist index after adding {}: {}", filename, e);
            return Err(e);
        }

        tracing::info!(
            "Added {} chunks from {} (index now holds {})",
            added,
            filename,
            state.len()
        );

        Ok(added)
    }

    /// The `top_k` chunks nearest to `query`, best first.
    pub async fn search(&self, query: &str, top_k: usize) -> AppResult<Vec<SearchHit>> {
        if query.trim().is_empty() {
            return Err(AppError::Input("Query cannot be empty".to_string()));
        }
        if top_k == 0 {
            return Err(AppError::Input("top_k must be at least 1".to_string()));
        }
        if self.state.read().await.is_empty() {
            return Ok(Vec::new());
        }

        let query_vector = embeddings::embed_texts(
            self.embedder.as_ref(),
            &[query.to_string()],
            self.embed_timeout,
        )
        .await?
        .pop()
        .ok_or_else(|| AppError::Embedding("No embedding returned for query".to_string()))?;

        let hits = self.state.read().await.search(&query_vector, top_k)?;

        tracing::debug!("Search returned {} hits for top_k {}", hits.len(), top_k);

        Ok(hits)
    }

    /// Discard the index and re-ingest every eligible document.
    pub async fn rebuild(&self) -> AppResult<RebuildReport> {
        let _gate = self.writer.lock().await;
        self.rebuild_locked().await
    }

    async fn rebuild_locked(&self) -> AppResult<RebuildReport> {
        let start = Instant::now();
        tracing::info!("Rebuilding index");

        self.reset_and_save().await?;

        let mut report = RebuildReport::default();
        for filename in self.source.list_eligible()? {
            let bytes = self.source.read(&filename)?;

            let text = match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(_) => {
                    tracing::warn!("Skipping {}: not valid UTF-8", filename);
                    report.skipped.push(filename);
                    continue;
                }
            };
            if text.trim().is_empty() {
                tracing::warn!("Skipping {}: file is empty", filename);
                report.skipped.push(filename);
                continue;
            }

            report.chunks += self.ingest_locked(&filename, &text).await?;
            report.documents += 1;
        }

        report.duration_secs = start.elapsed().as_secs_f64();

        tracing::info!(
            "Rebuilt index with {} documents ({} chunks, {} skipped) in {:.2}s",
            report.documents,
            report.chunks,
            report.skipped.len(),
            report.duration_secs
        );

        Ok(report)
    }

    /// Remove everything from the index and persist the empty state.
    pub async fn clear(&self) -> AppResult<()> {
        let _gate = self.writer.lock().await;
        self.reset_and_save().await?;
        tracing::info!("Index cleared");
        Ok(())
    }

    async fn reset_and_save(&self) -> AppResult<()> {
        let mut state = self.state.write().await;
        let previous = state.clone();
        state.reset();

        if let Err(e) = self.store.save(&state) {
            *state = previous;
            return Err(e);
        }
        Ok(())
    }

    pub async fn stats(&self) -> IndexStats {
        self.state.read().await.stats(self.store.exists())
    }

    /// Store a document and index it.
    ///
    /// Replacing an existing document rebuilds the index so the old chunks
    /// disappear.
    pub async fn upload(&self, filename: &str, bytes: &[u8]) -> AppResult<UploadReport> {
        validate_filename(filename)?;
        if !self.source.is_eligible(filename) {
            return Err(AppError::Input(format!(
                "Only .{} files are allowed",
                self.source.extension()
            )));
        }
        let text = std::str::from_utf8(bytes).map_err(|_| {
            AppError::Input(
                "File encoding error. Please upload UTF-8 encoded text files.".to_string(),
            )
        })?;
        if text.trim().is_empty() {
            return Err(AppError::Input("File is empty".to_string()));
        }

        let _gate = self.writer.lock().await;
        let replaced = self.source.exists(filename);
        self.source.write(filename, bytes)?;

        let chunks = if replaced {
            tracing::info!("Replacing existing document {}", filename);
            self.rebuild_locked().await?;
            self.state
                .read()
                .await
                .metadata()
                .iter()
                .filter(|entry| entry.filename == filename)
                .count()
        } else {
            match self.ingest_locked(filename, text).await {
                Ok(chunks) => chunks,
                Err(e) => {
                    if let Err(remove_err) = self.source.remove(filename) {
                        tracing::warn!("Failed to remove {} after error: {}", filename, remove_err);
                    }
                    return Err(e);
                }
            }
        };

        Ok(UploadReport {
            filename: filename.to_string(),
            size: text.chars().count(),
            chunks,
            replaced,
        })
    }

    /// Delete a document from the source and rebuild without it.
    pub async fn delete_document(&self, filename: &str) -> AppResult<RebuildReport> {
        validate_filename(filename)?;

        let _gate = self.writer.lock().await;
        if !self.source.exists(filename) {
            return Err(AppError::NotFound(format!(
                "Document not found: {}",
                filename
            )));
        }

        self.source.remove(filename)?;
        tracing::info!("Deleted document {}", filename);

        self.rebuild_locked().await
    }

    pub fn list_documents(&self) -> AppResult<Vec<DocumentInfo>> {
        self.source.list_documents()
    }
}

#[cfg(test)]
impl RetrievalEngine {
    pub(crate) async fn snapshot(&self) -> IndexState {
        self.state.read().await.clone()
    }
}
