//! Ordered chunk metadata, co-indexed with the vector index.

use crate::types::ChunkEntry;
use std::collections::BTreeSet;

/// Chunk entries in insertion order; entry `i` describes vector `i`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataStore {
    entries: Vec<ChunkEntry>,
}

impl MetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<ChunkEntry>) -> Self {
        Self { entries }
    }

    pub fn append(&mut self, entry: ChunkEntry) {
        self.entries.push(entry);
    }

    pub fn get(&self, position: usize) -> Option<&ChunkEntry> {
        self.entries.get(position)
    }

    /// Distinct source filenames, sorted.
    pub fn distinct_filenames(&self) -> BTreeSet<String> {
        self.entries.iter().map(|e| e.filename.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChunkEntry> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[ChunkEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn truncate(&mut self, len: usize) {
        self.entries.truncate(len);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
