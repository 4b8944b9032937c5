//! Answer modes of `ask`.

use super::support::*;
use crate::rag::{ask, AnswerMode};
use knowqa_core::AppError;
use tempfile::TempDir;

async fn engine_with_documents(temp: &TempDir) -> crate::engine::RetrievalEngine {
    let engine = open_engine(temp.path());
    engine
        .upload("cats.txt", b"The cat sat on the mat.")
        .await
        .unwrap();
    engine
        .upload("rust.txt", b"Rust compiles programs ahead of time.")
        .await
        .unwrap();
    engine
        .upload("paris.txt", b"Paris is the capital of France.")
        .await
        .unwrap();
    engine
        .upload("tea.txt", b"Green tea is brewed below boiling.")
        .await
        .unwrap();
    engine
}

#[tokio::test]
async fn test_ask_requires_documents_and_question() {
    let temp = TempDir::new().unwrap();
    let engine = open_engine(temp.path());

    let err = ask(&engine, None, "Where did the cat sit?", 3)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("No documents uploaded yet"));

    engine.upload("a.txt", b"content").await.unwrap();
    assert!(matches!(
        ask(&engine, None, "  ", 3).await,
        Err(AppError::Input(_))
    ));
}

#[tokio::test]
async fn test_ask_without_synthesizer_returns_top_chunk() {
    let temp = TempDir::new().unwrap();
    let engine = engine_with_documents(&temp).await;

    let answer = ask(&engine, None, "Where did the cat sit?", 3).await.unwrap();

    assert_eq!(answer.mode, AnswerMode::RetrievalOnly);
    assert_eq!(answer.answer, "The cat sat on the mat.");
    assert_eq!(answer.source.as_deref(), Some("cats.txt"));
    assert_eq!(answer.sources_used.len(), 3);
    assert_eq!(answer.sources_used[0], "cats.txt");
    assert!(answer.similarity > 0.0 && answer.similarity <= 1.0);
    assert_eq!(answer.similarity, (answer.similarity * 10_000.0).round() / 10_000.0);
}

#[tokio::test]
async fn test_ask_with_synthesizer() {
    let temp = TempDir::new().unwrap();
    let engine = engine_with_documents(&temp).await;
    let synthesizer = RecordingSynthesizer::default();

    let answer = ask(&engine, Some(&synthesizer), "  Where did the cat sit? ", 5)
        .await
        .unwrap();

    assert_eq!(answer.mode, AnswerMode::Synthesized);
    assert_eq!(answer.answer, "synthesized answer");
    assert_eq!(answer.sources_used.len(), 3);

    let calls = synthesizer.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let (question, context) = &calls[0];
    assert_eq!(question, "Where did the cat sit?");
    assert!(context.starts_with("From cats.txt:\nThe cat sat on the mat."));
    assert_eq!(context.matches("From ").count(), 3);
}

#[tokio::test]
async fn test_ask_falls_back_when_synthesis_fails() {
    let temp = TempDir::new().unwrap();
    let engine = engine_with_documents(&temp).await;

    let answer = ask(&engine, Some(&FailingSynthesizer), "capital of France", 3)
        .await
        .unwrap();

    assert_eq!(answer.mode, AnswerMode::RetrievalFallback);
    assert_eq!(answer.answer, "Paris is the capital of France.");
    assert_eq!(answer.source.as_deref(), Some("paris.txt"));
}

#[tokio::test]
async fn test_ask_with_single_hit() {
    let temp = TempDir::new().unwrap();
    let engine = engine_with_documents(&temp).await;

    let answer = ask(&engine, None, "Green tea", 1).await.unwrap();
    assert_eq!(answer.sources_used, vec!["tea.txt"]);
}
