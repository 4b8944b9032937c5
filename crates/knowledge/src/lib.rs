//! Document retrieval and question answering.
//!
//! Documents are split into word chunks, embedded, and stored in an exact
//! flat index whose metadata travels with it. Questions are answered from
//! the nearest chunks, optionally through a language model.

pub mod chunker;
pub mod embeddings;
pub mod engine;
pub mod metadata;
pub mod persistence;
pub mod rag;
pub mod sources;
pub mod state;
pub mod types;
pub mod vector_index;

#[cfg(test)]
mod tests;

pub use chunker::{chunk_text, Chunker};
pub use embeddings::{create_provider, EmbeddingConfig, EmbeddingProvider, EmbeddingSignature};
pub use engine::{EngineSettings, OpenMode, RetrievalEngine};
pub use persistence::IndexStore;
pub use rag::{ask, Answer, AnswerMode, AnswerSynthesizer, LlmSynthesizer, SynthesisStatus};
pub use sources::{DirectorySource, DocumentSource};
pub use state::IndexState;
pub use types::{ChunkEntry, DocumentInfo, IndexStats, RebuildReport, SearchHit, UploadReport};
pub use vector_index::{similarity, FlatIndex};
