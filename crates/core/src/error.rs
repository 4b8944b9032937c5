//! Error types for knowqa.
//!
//! A single error enum covers every failure category of the service:
//! configuration, rejected input, storage, embedding, language-model
//! synthesis and serialization.

use thiserror::Error;

/// Unified error type for knowqa.
///
/// All fallible functions return `Result<T, AppError>`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Caller-supplied input was rejected before reaching the index
    /// (blank document, blank question, non-UTF-8 upload, bad filename).
    #[error("Invalid input: {0}")]
    Input(String),

    /// A named document does not exist in the document source.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Persisted index could not be written (or read, where fatal).
    #[error("Storage error: {0}")]
    Storage(String),

    /// Embedding backend failed or returned malformed output.
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Persisted vectors were produced by an embedder of another dimension.
    #[error(
        "Dimension mismatch: index on disk has dimension {found}, embedder produces {expected}. \
         Run `knowqa rebuild` to re-embed the documents."
    )]
    DimensionMismatch { expected: usize, found: usize },

    /// Persisted vectors were produced by another embedding model.
    #[error(
        "Embedding model mismatch: index on disk was built with {found}, configured embedder is {expected}. \
         Run `knowqa rebuild` to re-embed the documents."
    )]
    EmbeddingModelMismatch { expected: String, found: String },

    /// LLM provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Answer synthesis failed (recoverable by retrieval fallback)
    #[error("Synthesis error: {0}")]
    Synthesis(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
