//! Embedding layer.
//!
//! Provider-agnostic embedding generation plus the checks the engine applies
//! to every batch before anything is stored.

pub mod config;
pub mod provider;
pub mod providers;

pub use config::{EmbeddingConfig, EmbeddingSignature};
pub use provider::{create_provider, EmbeddingProvider};

use knowqa_core::{AppError, AppResult};
use std::time::Duration;

/// Embed `texts` with `provider`, giving up after `timeout`.
pub async fn embed_texts(
    provider: &dyn EmbeddingProvider,
    texts: &[String],
    timeout: Duration,
) -> AppResult<Vec<Vec<f32>>> {
    if texts.is_empty() {
        return Ok(Vec::new());
    }

    tracing::debug!(
        "Embedding {} texts using provider '{}' (model: {})",
        texts.len(),
        provider.provider_name(),
        provider.model_name()
    );

    let embeddings = tokio::time::timeout(timeout, provider.embed_batch(texts))
        .await
        .map_err(|_| {
            AppError::Embedding(format!(
                "Embedding {} texts timed out after {}s",
                texts.len(),
                timeout.as_secs()
            ))
        })??;

    validate_embeddings(&embeddings, texts.len(), provider.dimensions())?;

    Ok(embeddings)
}

/// Check that a batch has one vector per input and that every vector has
/// the expected dimension and only finite components.
pub fn validate_embeddings(
    embeddings: &[Vec<f32>],
    expected_count: usize,
    dimension: usize,
) -> AppResult<()> {
    if embeddings.len() != expected_count {
        return Err(AppError::Embedding(format!(
            "Embedder returned {} vectors for {} texts",
            embeddings.len(),
            expected_count
        )));
    }

    if let Some((i, bad)) = embeddings
        .iter()
        .enumerate()
        .find(|(_, v)| v.len() != dimension)
    {
        return Err(AppError::Embedding(format!(
            "Embedding {} has dimension {}, expected {}",
            i,
            bad.len(),
            dimension
        )));
    }

    if let Some(i) = embeddings
        .iter()
        .position(|v| v.iter().any(|x| !x.is_finite()))
    {
        return Err(AppError::Embedding(format!(
            "Embedding {} contains non-finite values",
            i
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::providers::TrigramProvider;

    #[test]
    fn test_validate_embeddings() {
        let good = vec![vec![0.0; 4], vec![1.0; 4]];
        assert!(validate_embeddings(&good, 2, 4).is_ok());

        let err = validate_embeddings(&good, 3, 4).unwrap_err();
        assert!(err.to_string().contains("2 vectors for 3 texts"));

        let ragged = vec![vec![0.0; 4], vec![1.0; 3]];
        let err = validate_embeddings(&ragged, 2, 4).unwrap_err();
        assert!(matches!(err, AppError::Embedding(_)));
        assert!(err.to_string().contains("Embedding 1 has dimension 3"));
    }

    #[test]
    fn test_validate_embeddings_rejects_non_finite() {
        for bad in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            let batch = vec![vec![0.0; 4], vec![0.5, bad, 0.5, 0.5]];
            let err = validate_embeddings(&batch, 2, 4).unwrap_err();
            assert!(matches!(err, AppError::Embedding(_)));
            assert!(err.to_string().contains("Embedding 1 contains non-finite"));
        }
    }

    #[tokio::test]
    async fn test_embed_texts_with_trigram() {
        let provider = TrigramProvider::new(64);
        let texts = vec!["hello world".to_string(), "rust programming".to_string()];

        let embeddings = embed_texts(&provider, &texts, Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(embeddings.len(), 2);
        assert!(embeddings.iter().all(|e| e.len() == 64));
    }

    #[tokio::test]
    async fn test_embed_texts_empty_input() {
        let provider = TrigramProvider::new(64);
        let embeddings = embed_texts(&provider, &[], Duration::from_secs(5))
            .await
            .unwrap();
        assert!(embeddings.is_empty());
    }
}
