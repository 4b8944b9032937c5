//! Exact flat vector index.
//!
//! Vectors are stored back to back in a single `Vec<f32>`; position `i`
//! occupies `data[i * dimension..(i + 1) * dimension]`. Search is an exact
//! linear scan over squared Euclidean distance.

use knowqa_core::{AppError, AppResult};
use std::cmp::Ordering;

/// A stored vector matched by a search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Insertion position of the vector
    pub position: usize,

    /// Squared Euclidean distance to the query
    pub distance: f32,
}

/// Map a squared L2 distance to a display score in (0, 1].
///
/// A NaN distance scores 0.
pub fn similarity(distance: f32) -> f32 {
    if distance.is_nan() {
        return 0.0;
    }
    1.0 / (1.0 + distance.max(0.0))
}

/// Squared Euclidean distance between two equal-length slices.
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Append-only flat index with a fixed dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatIndex {
    dimension: usize,
    data: Vec<f32>,
}

impl FlatIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            data: Vec::new(),
        }
    }

    /// Rebuild an index from a flat buffer, as read back from disk.
    pub fn from_flat(dimension: usize, data: Vec<f32>) -> AppResult<Self> {
        if dimension == 0 || data.len() % dimension != 0 {
            return Err(AppError::Storage(format!(
                "Vector buffer of {} values does not divide into dimension {}",
                data.len(),
                dimension
            )));
        }
        Ok(Self { dimension, data })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        if self.dimension == 0 {
            0
        } else {
            self.data.len() / self.dimension
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Check a batch without modifying the index.
    pub fn check(&self, vectors: &[Vec<f32>]) -> AppResult<()> {
        match vectors.iter().position(|v| v.len() != self.dimension) {
            Some(i) => Err(AppError::Embedding(format!(
                "Vector {} has dimension {}, index dimension is {}",
                i,
                vectors[i].len(),
                self.dimension
            ))),
            None => Ok(()),
        }
    }

    /// Append vectors in order. Either all are appended or none.
    pub fn append(&mut self, vectors: &[Vec<f32>]) -> AppResult<()> {
        self.check(vectors)?;
        self.data.reserve(vectors.len() * self.dimension);
        for vector in vectors {
            self.data.extend_from_slice(vector);
        }
        Ok(())
    }

    /// The vector stored at `position`.
    pub fn vector(&self, position: usize) -> Option<&[f32]> {
        let start = position.checked_mul(self.dimension)?;
        self.data.get(start..start + self.dimension)
    }

    pub fn as_flat(&self) -> &[f32] {
        &self.data
    }

    /// Drop everything from `len` onward.
    pub fn truncate(&mut self, len: usize) {
        self.data.truncate(len * self.dimension);
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// The `top_k` nearest stored vectors, nearest first.
    ///
    /// Equal distances keep insertion order. Returns every stored vector when
    /// fewer than `top_k` exist, and nothing for an empty index or `top_k == 0`.
    pub fn search(&self, query: &[f32], top_k: usize) -> AppResult<Vec<Neighbor>> {
        if query.len() != self.dimension {
            return Err(AppError::Embedding(format!(
                "Query has dimension {}, index dimension is {}",
                query.len(),
                self.dimension
            )));
        }
        if top_k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        let mut scored: Vec<Neighbor> = self
            .data
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(position, vector)| Neighbor {
                position,
                distance: squared_l2(query, vector),
            })
            .collect();

        let order = |a: &Neighbor, b: &Neighbor| -> Ordering {
            a.distance
                .total_cmp(&b.distance)
                .then(a.position.cmp(&b.position))
        };

        if top_k < scored.len() {
            scored.select_nth_unstable_by(top_k - 1, order);
            scored.truncate(top_k);
        }
        scored.sort_unstable_by(order);

        Ok(scored)
    }
}
