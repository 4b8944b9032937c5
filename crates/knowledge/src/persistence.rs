//! On-disk persistence for the index state.
//!
//! Two artifacts live in the store directory:
//!
//! - `vectors.bin`: magic `KQAV`, format version (u32 LE), dimension (u32 LE),
//!   vector count (u64 LE), then `count * dimension` f32 LE values.
//! - `metadata.json`: format version, dimension, count, SHA-256 of
//!   `vectors.bin`, the embedding provider and model, save time and the
//!   ordered chunk entries.
//!
//! Each artifact is written to a temporary sibling, synced and renamed over
//! the previous version. The vector blob is replaced first and the metadata
//! last; a crash in between leaves a checksum mismatch, which loads as an
//! absent index.

use crate::embeddings::EmbeddingSignature;
use crate::metadata::MetadataStore;
use crate::state::IndexState;
use crate::types::ChunkEntry;
use crate::vector_index::FlatIndex;
use chrono::{DateTime, Utc};
use knowqa_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const VECTORS_FILE: &str = "vectors.bin";
pub const METADATA_FILE: &str = "metadata.json";

const MAGIC: &[u8; 4] = b"KQAV";
const FORMAT_VERSION: u32 = 1;
const HEADER_LEN: usize = 4 + 4 + 4 + 8;

#[derive(Debug, Serialize, Deserialize)]
struct MetadataFile {
    format_version: u32,
    dimension: usize,
    count: usize,
    vectors_sha256: String,
    #[serde(default)]
    embedding_provider: Option<String>,
    #[serde(default)]
    embedding_model: Option<String>,
    saved_at: DateTime<Utc>,
    entries: Vec<ChunkEntry>,
}

/// Saves and loads [`IndexState`] under one directory.
#[derive(Debug, Clone)]
pub struct IndexStore {
    dir: PathBuf,
    embedder: Option<EmbeddingSignature>,
}

impl IndexStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            embedder: None,
        }
    }

    /// Record `signature` as the embedder of every state saved from now on.
    pub fn with_embedder(mut self, signature: EmbeddingSignature) -> Self {
        self.embedder = Some(signature);
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn embedder(&self) -> Option<&EmbeddingSignature> {
        self.embedder.as_ref()
    }

    pub fn vectors_path(&self) -> PathBuf {
        self.dir.join(VECTORS_FILE)
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.dir.join(METADATA_FILE)
    }

    /// Whether both artifacts are present.
    pub fn exists(&self) -> bool {
        self.vectors_path().is_file() && self.metadata_path().is_file()
    }

    /// Write the full state, replacing any previous version.
    pub fn save(&self, state: &IndexState) -> AppResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            AppError::Storage(format!(
                "Failed to create vector store directory {:?}: {}",
                self.dir, e
            ))
        })?;

        let blob = encode_vectors(state.vectors())?;
        let metadata = MetadataFile {
            format_version: FORMAT_VERSION,
            dimension: state.dimension(),
            count: state.len(),
            vectors_sha256: sha256_hex(&blob),
            embedding_provider: self.embedder.as_ref().map(|s| s.provider.clone()),
            embedding_model: self.embedder.as_ref().map(|s| s.model.clone()),
            saved_at: Utc::now(),
            entries: state.metadata().entries().to_vec(),
        };
        let json = serde_json::to_vec(&metadata)
            .map_err(|e| AppError::Storage(format!("Failed to serialize metadata: {}", e)))?;

        write_atomic(&self.vectors_path(), &blob)?;
        write_atomic(&self.metadata_path(), &json)?;

        tracing::debug!(
            "Saved index ({} chunks, dimension {}) to {:?}",
            state.len(),
            state.dimension(),
            self.dir
        );

        Ok(())
    }

    /// Read the persisted state.
    ///
    /// Missing, unreadable, truncated or inconsistent artifacts yield
    /// `Ok(None)` after a warning; the caller starts from an empty index.
    pub fn load(&self) -> AppResult<Option<IndexState>> {
        Ok(self.load_recorded()?.map(|(state, _)| state))
    }

    /// Like [`load`](Self::load), but fail when a non-empty persisted index
    /// was built by an embedder other than `expected`.
    ///
    /// Indexes saved without an embedder record are only checked for their
    /// dimension. A mismatching empty index loads as `None`.
    pub fn load_for(&self, expected: &EmbeddingSignature) -> AppResult<Option<IndexState>> {
        let Some((state, built_with)) = self.load_recorded()? else {
            return Ok(None);
        };

        let consistent = match built_with {
            Some(built_with) => expected.validate_consistency(&built_with),
            None if state.dimension() != expected.dimensions => Err(AppError::DimensionMismatch {
                expected: expected.dimensions,
                found: state.dimension(),
            }),
            None => Ok(()),
        };

        match consistent {
            Ok(()) => Ok(Some(state)),
            Err(e) if state.is_empty() => {
                tracing::info!("Persisted index is empty, starting fresh for {}: {}", expected, e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn load_recorded(&self) -> AppResult<Option<(IndexState, Option<EmbeddingSignature>)>> {
        if !self.exists() {
            tracing::debug!("No persisted index in {:?}", self.dir);
            return Ok(None);
        }

        match self.read_state() {
            Ok((state, built_with)) => {
                tracing::info!(
                    "Loaded index with {} chunks (dimension {}) from {:?}",
                    state.len(),
                    state.dimension(),
                    self.dir
                );
                Ok(Some((state, built_with)))
            }
            Err(e) => {
                tracing::warn!(
                    "Ignoring unusable index in {:?}, starting empty: {}",
                    self.dir,
                    e
                );
                Ok(None)
            }
        }
    }

    fn read_state(&self) -> AppResult<(IndexState, Option<EmbeddingSignature>)> {
        let blob = fs::read(self.vectors_path())?;
        let json = fs::read(self.metadata_path())?;

        let metadata: MetadataFile = serde_json::from_slice(&json)?;
        if metadata.format_version != FORMAT_VERSION {
            return Err(AppError::Storage(format!(
                "Unsupported metadata format version {}",
                metadata.format_version
            )));
        }

        let checksum = sha256_hex(&blob);
        if checksum != metadata.vectors_sha256 {
            return Err(AppError::Storage(
                "Vector blob checksum does not match metadata".to_string(),
            ));
        }

        let vectors = decode_vectors(&blob)?;
        if vectors.dimension() != metadata.dimension
            || vectors.len() != metadata.count
            || metadata.entries.len() != metadata.count
        {
            return Err(AppError::Storage(format!(
                "Artifact mismatch: blob has {} vectors of dimension {}, metadata records {} of dimension {} with {} entries",
                vectors.len(),
                vectors.dimension(),
                metadata.count,
                metadata.dimension,
                metadata.entries.len()
            )));
        }

        let built_with = match (metadata.embedding_provider, metadata.embedding_model) {
            (Some(provider), Some(model)) => {
                Some(EmbeddingSignature::new(provider, model, metadata.dimension))
            }
            _ => None,
        };
        let state = IndexState::from_parts(vectors, MetadataStore::from_entries(metadata.entries))?;

        Ok((state, built_with))
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

fn encode_vectors(index: &FlatIndex) -> AppResult<Vec<u8>> {
    let dimension = u32::try_from(index.dimension()).map_err(|_| {
        AppError::Storage(format!("Dimension {} is too large", index.dimension()))
    })?;

    let values = index.as_flat();
    let mut blob = Vec::with_capacity(HEADER_LEN + values.len() * 4);
    blob.extend_from_slice(MAGIC);
    blob.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    blob.extend_from_slice(&dimension.to_le_bytes());
    blob.extend_from_slice(&(index.len() as u64).to_le_bytes());
    for value in values {
        blob.extend_from_slice(&value.to_le_bytes());
    }
    Ok(blob)
}

fn decode_vectors(blob: &[u8]) -> AppResult<FlatIndex> {
    if blob.len() < HEADER_LEN || &blob[..4] != MAGIC {
        return Err(AppError::Storage(
            "Vector blob has no valid header".to_string(),
        ));
    }

    let read_u32 = |at: usize| u32::from_le_bytes([blob[at], blob[at + 1], blob[at + 2], blob[at + 3]]);

    let version = read_u32(4);
    if version != FORMAT_VERSION {
        return Err(AppError::Storage(format!(
            "Unsupported vector blob version {}",
            version
        )));
    }

    let dimension = read_u32(8) as usize;
    let mut count_bytes = [0u8; 8];
    count_bytes.copy_from_slice(&blob[12..HEADER_LEN]);
    let count = u64::from_le_bytes(count_bytes) as usize;

    let body = &blob[HEADER_LEN..];
    let expected = count
        .checked_mul(dimension)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| AppError::Storage("Vector blob header overflows".to_string()))?;
    if body.len() != expected {
        return Err(AppError::Storage(format!(
            "Vector blob holds {} bytes, header promises {}",
            body.len(),
            expected
        )));
    }

    let data = body
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();

    FlatIndex::from_flat(dimension, data)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> AppResult<()> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| AppError::Storage(format!("Invalid artifact path {:?}", path)))?;
    let tmp = path.with_file_name(format!(".{}.tmp", file_name));

    let result = (|| -> std::io::Result<()> {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        fs::rename(&tmp, path)
    })();

    result.map_err(|e| {
        let _ = fs::remove_file(&tmp);
        AppError::Storage(format!("Failed to write {:?}: {}", path, e))
    })
}
