//! Shared fixtures for engine tests.

use crate::embeddings::providers::TrigramProvider;
use crate::embeddings::EmbeddingProvider;
use crate::engine::{EngineSettings, RetrievalEngine};
use crate::persistence::IndexStore;
use crate::rag::AnswerSynthesizer;
use crate::sources::{DirectorySource, DocumentSource};
use async_trait::async_trait;
use knowqa_core::{AppError, AppResult};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const DIMENSION: usize = 384;

pub fn uploads(dir: &Path) -> DirectorySource {
    DirectorySource::new(dir.join("uploads"), "txt")
}

pub fn store(dir: &Path) -> IndexStore {
    IndexStore::new(dir.join("vector_store"))
}

pub fn settings() -> EngineSettings {
    EngineSettings {
        chunk_size: 500,
        embed_timeout: Duration::from_secs(5),
    }
}

/// Engine over `dir` with the trigram embedder, loading any saved index.
pub fn open_engine(dir: &Path) -> RetrievalEngine {
    open_with(dir, Arc::new(TrigramProvider::new(DIMENSION)))
}

pub fn open_with(dir: &Path, embedder: Arc<dyn EmbeddingProvider>) -> RetrievalEngine {
    RetrievalEngine::open(settings(), embedder, Arc::new(uploads(dir)), store(dir)).unwrap()
}

pub fn fresh_with(dir: &Path, embedder: Arc<dyn EmbeddingProvider>) -> RetrievalEngine {
    RetrievalEngine::fresh(settings(), embedder, Arc::new(uploads(dir)), store(dir))
}

/// Put a file straight into the uploads directory, bypassing the engine.
pub fn drop_file(dir: &Path, filename: &str, bytes: &[u8]) {
    uploads(dir).write(filename, bytes).unwrap();
}

/// `n` distinct words: `w0 w1 ...`.
pub fn words(n: usize) -> String {
    (0..n)
        .map(|i| format!("w{}", i))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Embedder whose every call fails.
#[derive(Debug)]
pub struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    fn provider_name(&self) -> &str {
        "failing"
    }

    fn model_name(&self) -> &str {
        "failing"
    }

    fn dimensions(&self) -> usize {
        DIMENSION
    }

    async fn embed_batch(&self, _texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Err(AppError::Embedding("backend unavailable".to_string()))
    }
}

/// Embedder that returns vectors one component short.
#[derive(Debug)]
pub struct WrongDimensionEmbedder;

#[async_trait]
impl EmbeddingProvider for WrongDimensionEmbedder {
    fn provider_name(&self) -> &str {
        "wrong-dimension"
    }

    fn model_name(&self) -> &str {
        "wrong-dimension"
    }

    fn dimensions(&self) -> usize {
        DIMENSION
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|_| vec![0.5; DIMENSION - 1]).collect())
    }
}

/// Embedder that drops the last vector of every batch.
#[derive(Debug)]
pub struct ShortBatchEmbedder;

#[async_trait]
impl EmbeddingProvider for ShortBatchEmbedder {
    fn provider_name(&self) -> &str {
        "short-batch"
    }

    fn model_name(&self) -> &str {
        "short-batch"
    }

    fn dimensions(&self) -> usize {
        DIMENSION
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .skip(1)
            .map(|_| vec![0.0; DIMENSION])
            .collect())
    }
}

/// Embedder that never answers in time.
#[derive(Debug)]
pub struct StalledEmbedder;

#[async_trait]
impl EmbeddingProvider for StalledEmbedder {
    fn provider_name(&self) -> &str {
        "stalled"
    }

    fn model_name(&self) -> &str {
        "stalled"
    }

    fn dimensions(&self) -> usize {
        DIMENSION
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(texts.iter().map(|_| vec![0.0; DIMENSION]).collect())
    }
}

/// Embedder of the configured dimension but a different model.
#[derive(Debug)]
pub struct OtherModelEmbedder;

#[async_trait]
impl EmbeddingProvider for OtherModelEmbedder {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        "all-minilm"
    }

    fn dimensions(&self) -> usize {
        DIMENSION
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|t| {
                let mut v = vec![0.0; DIMENSION];
                v[t.len() % DIMENSION] = 1.0;
                v
            })
            .collect())
    }
}

/// Synthesizer that records its inputs and returns a canned answer.
#[derive(Default)]
pub struct RecordingSynthesizer {
    pub calls: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl AnswerSynthesizer for RecordingSynthesizer {
    fn describe(&self) -> String {
        "recording".to_string()
    }

    async fn synthesize(&self, question: &str, context: &str) -> AppResult<String> {
        self.calls
            .lock()
            .unwrap()
            .push((question.to_string(), context.to_string()));
        Ok("synthesized answer".to_string())
    }
}

/// Synthesizer whose backend is down.
pub struct FailingSynthesizer;

#[async_trait]
impl AnswerSynthesizer for FailingSynthesizer {
    fn describe(&self) -> String {
        "failing".to_string()
    }

    async fn synthesize(&self, _question: &str, _context: &str) -> AppResult<String> {
        Err(AppError::Synthesis("model unavailable".to_string()))
    }
}
