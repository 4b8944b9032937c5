//! Index state: the flat index and its metadata, kept in lockstep.

use crate::metadata::MetadataStore;
use crate::types::{ChunkEntry, IndexStats, SearchHit};
use crate::vector_index::{similarity, FlatIndex};
use knowqa_core::{AppError, AppResult};

/// The unit of persistence.
///
/// Every mutator changes both containers together, so `vectors.len()` always
/// equals `metadata.len()`.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexState {
    vectors: FlatIndex,
    metadata: MetadataStore,
}

impl IndexState {
    pub fn new(dimension: usize) -> Self {
        Self {
            vectors: FlatIndex::new(dimension),
            metadata: MetadataStore::new(),
        }
    }

    /// Pair a loaded index with its metadata.
    pub fn from_parts(vectors: FlatIndex, metadata: MetadataStore) -> AppResult<Self> {
        if vectors.len() != metadata.len() {
            return Err(AppError::Storage(format!(
                "Index holds {} vectors but {} metadata entries",
                vectors.len(),
                metadata.len()
            )));
        }
        Ok(Self { vectors, metadata })
    }

    pub fn dimension(&self) -> usize {
        self.vectors.dimension()
    }

    pub fn len(&self) -> usize {
        self.metadata.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metadata.is_empty()
    }

    pub fn vectors(&self) -> &FlatIndex {
        &self.vectors
    }

    pub fn metadata(&self) -> &MetadataStore {
        &self.metadata
    }

    pub fn document_count(&self) -> usize {
        self.metadata.distinct_filenames().len()
    }

    pub fn stats(&self, index_exists: bool) -> IndexStats {
        IndexStats {
            total_chunks: self.len(),
            total_documents: self.document_count(),
            dimension: self.dimension(),
            index_exists,
        }
    }

    /// Append one document's chunks and their embeddings.
    ///
    /// Nothing is changed unless the batch is complete and every vector has
    /// the index dimension.
    pub fn append_document(
        &mut self,
        filename: &str,
        chunks: Vec<String>,
        embeddings: &[Vec<f32>],
    ) -> AppResult<()> {
        if chunks.len() != embeddings.len() {
            return Err(AppError::Embedding(format!(
                "Got {} embeddings for {} chunks of {}",
                embeddings.len(),
                chunks.len(),
                filename
            )));
        }
        self.vectors.append(embeddings)?;
        for content in chunks {
            self.metadata.append(ChunkEntry::new(filename, content));
        }
        Ok(())
    }

    /// Roll both containers back to `len` entries.
    pub fn truncate(&mut self, len: usize) {
        self.vectors.truncate(len);
        self.metadata.truncate(len);
    }

    pub fn reset(&mut self) {
        self.vectors.clear();
        self.metadata.clear();
    }

    /// Nearest chunks to `query`, ranked from 1.
    pub fn search(&self, query: &[f32], top_k: usize) -> AppResult<Vec<SearchHit>> {
        let neighbors = self.vectors.search(query, top_k)?;

        neighbors
            .into_iter()
            .enumerate()
            .map(|(i, neighbor)| {
                let entry = self.metadata.get(neighbor.position).ok_or_else(|| {
                    AppError::Storage(format!(
                        "No metadata for vector at position {}",
                        neighbor.position
                    ))
                })?;
                Ok(SearchHit {
                    filename: entry.filename.clone(),
                    content: entry.content.clone(),
                    distance: neighbor.distance,
                    similarity: similarity(neighbor.distance),
                    rank: i + 1,
                })
            })
            .collect()
    }
}
