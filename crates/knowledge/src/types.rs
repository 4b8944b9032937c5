//! Knowledge system type definitions.

use serde::{Deserialize, Serialize};

/// One metadata record, co-indexed with a vector in the flat index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkEntry {
    /// Name of the source document
    pub filename: String,

    /// Chunk text
    pub content: String,
}

impl ChunkEntry {
    pub fn new(filename: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }
}

/// A ranked search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Source document of the chunk
    pub filename: String,

    /// Chunk text
    pub content: String,

    /// Squared Euclidean distance to the query
    pub distance: f32,

    /// `1 / (1 + distance)`, in (0, 1]
    pub similarity: f32,

    /// 1-based rank, nearest first
    pub rank: usize,
}

/// Statistics for the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Number of stored chunks (== vectors)
    pub total_chunks: usize,

    /// Number of distinct source filenames
    pub total_documents: usize,

    /// Embedding dimension
    pub dimension: usize,

    /// Whether persisted artifacts exist on disk
    pub index_exists: bool,
}

/// A source document as listed by the document source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub filename: String,
    pub size_bytes: u64,
}

/// Outcome of a rebuild.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RebuildReport {
    /// Documents re-ingested
    pub documents: usize,

    /// Chunks appended across all documents
    pub chunks: usize,

    /// Eligible files left out (blank or not valid UTF-8)
    pub skipped: Vec<String>,

    /// Duration in seconds
    pub duration_secs: f64,
}

/// Outcome of an upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadReport {
    pub filename: String,

    /// Decoded text length in characters
    pub size: usize,

    /// Chunks now indexed for this document
    pub chunks: usize,

    /// Whether an existing document of the same name was replaced
    pub replaced: bool,
}
