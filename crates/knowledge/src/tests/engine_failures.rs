//! Failure handling: nothing is partially applied.

use super::support::*;
use crate::engine::{EngineSettings, RetrievalEngine};
use crate::sources::DocumentSource;
use knowqa_core::AppError;
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

#[tokio::test]
async fn test_embedding_failure_appends_nothing() {
    let temp = TempDir::new().unwrap();
    let engine = open_with(temp.path(), Arc::new(FailingEmbedder));

    let err = engine.ingest("a.txt", "hello world").await.unwrap_err();
    assert!(matches!(err, AppError::Embedding(_)));

    assert_eq!(engine.stats().await.total_chunks, 0);
    assert!(!engine.store().exists());
}

#[tokio::test]
async fn test_wrong_dimension_vectors_are_rejected() {
    let temp = TempDir::new().unwrap();
    let engine = open_with(temp.path(), Arc::new(WrongDimensionEmbedder));

    let err = engine.ingest("a.txt", &words(800)).await.unwrap_err();
    assert!(matches!(err, AppError::Embedding(_)));

    let state = engine.snapshot().await;
    assert!(state.is_empty());
    assert!(state.vectors().is_empty());
}

#[tokio::test]
async fn test_short_batch_is_rejected() {
    let temp = TempDir::new().unwrap();
    let engine = open_with(temp.path(), Arc::new(ShortBatchEmbedder));

    let err = engine.ingest("a.txt", &words(1200)).await.unwrap_err();
    assert!(err.to_string().contains("2 vectors for 3 texts"));
    assert_eq!(engine.stats().await.total_chunks, 0);
}

#[tokio::test]
async fn test_stalled_embedder_times_out() {
    let temp = TempDir::new().unwrap();
    let engine = RetrievalEngine::open(
        EngineSettings {
            chunk_size: 500,
            embed_timeout: Duration::from_millis(50),
        },
        Arc::new(StalledEmbedder),
        Arc::new(uploads(temp.path())),
        store(temp.path()),
    )
    .unwrap();

    let err = engine.ingest("a.txt", "hello").await.unwrap_err();
    assert!(matches!(err, AppError::Embedding(_)));
    assert!(err.to_string().contains("timed out"));
    assert_eq!(engine.stats().await.total_chunks, 0);
}

#[tokio::test]
async fn test_failed_save_rolls_back_memory() {
    let temp = TempDir::new().unwrap();
    let engine = open_engine(temp.path());
    engine.ingest("a.txt", "apples and pears").await.unwrap();

    let store_dir = temp.path().join("vector_store");
    fs::remove_dir_all(&store_dir).unwrap();
    fs::write(&store_dir, b"not a directory").unwrap();

    let err = engine.ingest("b.txt", "bananas").await.unwrap_err();
    assert!(matches!(err, AppError::Storage(_)));

    let state = engine.snapshot().await;
    assert_eq!(state.len(), 1);
    assert_eq!(state.vectors().len(), 1);

    let hits = engine.search("bananas", 5).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].filename, "a.txt");

    assert!(matches!(engine.clear().await, Err(AppError::Storage(_))));
    assert_eq!(engine.snapshot().await.len(), 1);
}

#[tokio::test]
async fn test_failed_upload_removes_new_file() {
    let temp = TempDir::new().unwrap();
    let engine = open_with(temp.path(), Arc::new(FailingEmbedder));

    let err = engine.upload("a.txt", b"hello world").await.unwrap_err();
    assert!(matches!(err, AppError::Embedding(_)));
    assert!(!uploads(temp.path()).exists("a.txt"));
    assert!(engine.list_documents().unwrap().is_empty());
}

#[tokio::test]
async fn test_rebuild_aborts_on_embedding_failure() {
    let temp = TempDir::new().unwrap();
    drop_file(temp.path(), "a.txt", b"hello world");

    let engine = fresh_with(temp.path(), Arc::new(FailingEmbedder));
    assert!(matches!(
        engine.rebuild().await,
        Err(AppError::Embedding(_))
    ));
    assert_eq!(engine.stats().await.total_chunks, 0);
}

#[tokio::test]
async fn test_reopen_with_other_embedding_model_fails_loudly() {
    let temp = TempDir::new().unwrap();
    open_engine(temp.path())
        .ingest("a.txt", "The cat sat on the mat.")
        .await
        .unwrap();

    let result = RetrievalEngine::open(
        settings(),
        Arc::new(OtherModelEmbedder),
        Arc::new(uploads(temp.path())),
        store(temp.path()),
    );
    match result {
        Err(AppError::EmbeddingModelMismatch { expected, found }) => {
            assert_eq!(expected, "ollama/all-minilm");
            assert_eq!(found, "trigram/trigram-v1");
        }
        Err(other) => panic!("expected model mismatch, got {}", other),
        Ok(_) => panic!("index built by another model was opened"),
    }

    drop_file(temp.path(), "a.txt", b"The cat sat on the mat.");
    let rebuilt = fresh_with(temp.path(), Arc::new(OtherModelEmbedder));
    rebuilt.rebuild().await.unwrap();

    let reopened = open_with(temp.path(), Arc::new(OtherModelEmbedder));
    assert_eq!(reopened.stats().await.total_chunks, 1);
    assert!(matches!(
        RetrievalEngine::open(
            settings(),
            Arc::new(crate::embeddings::providers::TrigramProvider::new(DIMENSION)),
            Arc::new(uploads(temp.path())),
            store(temp.path()),
        ),
        Err(AppError::EmbeddingModelMismatch { .. })
    ));
}
