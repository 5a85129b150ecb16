//! Exact (brute-force) vector index.
//!
//! [`FlatIndex`] is immutable once built: a rebuild creates a new value.
//! [`VectorIndex`] wraps an optional `FlatIndex` and models the
//! "not built yet" state explicitly. It is meant for callers that keep one
//! mutable index; callers that publish immutable snapshots hold a
//! `FlatIndex` directly.

use crate::distance::squared_euclidean;
use crate::error::{Error, Result};
use crate::types::SearchHit;
use tracing::{debug, instrument};

/// Immutable flat index over a fixed set of equal-length vectors.
///
/// Vectors are stored contiguously in insertion order, so a vector's
/// position doubles as the caller's chunk position.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    /// Row-major storage, `len * dimensions` values.
    data: Vec<f32>,
    /// Vector dimensions.
    dimensions: usize,
    /// Number of stored vectors.
    len: usize,
}

impl FlatIndex {
    /// Build an index from an ordered sequence of vectors.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyInput`] if `vectors` is empty.
    /// - [`Error::InvalidVector`] for zero-dimensional vectors or NaN/Inf values.
    /// - [`Error::DimensionMismatch`] if vectors differ in length. The first
    ///   vector fixes the dimension.
    #[instrument(skip(vectors), fields(count = vectors.len()))]
    pub fn build(vectors: Vec<Vec<f32>>) -> Result<Self> {
        let Some(first) = vectors.first() else {
            return Err(Error::EmptyInput);
        };

        let dimensions = first.len();
        if dimensions == 0 {
            return Err(Error::InvalidVector("Dimensions must be > 0".to_string()));
        }

        let mut data = Vec::with_capacity(vectors.len() * dimensions);
        for vector in &vectors {
            validate(vector, dimensions)?;
            data.extend_from_slice(vector);
        }

        let len = vectors.len();
        debug!(len, dimensions, "Built flat index");

        Ok(Self {
            data,
            dimensions,
            len,
        })
    }

    /// Get the vector dimensions.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Get the number of vectors in the index.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the index holds no vectors.
    ///
    /// [`FlatIndex::build`] rejects empty input, so a built index is never empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get the stored vector at `position`.
    pub fn get(&self, position: usize) -> Option<&[f32]> {
        if position >= self.len {
            return None;
        }
        let start = position * self.dimensions;
        Some(&self.data[start..start + self.dimensions])
    }

    /// Find the `k` nearest vectors to `query`.
    ///
    /// `k` is clamped to `[1, len]`. Results are ordered by ascending squared
    /// distance; equal distances keep insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if the query has the wrong length,
    /// or [`Error::InvalidVector`] if it contains NaN/Inf.
    #[instrument(skip(self, query), fields(dim = query.len()))]
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        validate(query, self.dimensions)?;

        let k = k.clamp(1, self.len);

        let mut hits: Vec<SearchHit> = self
            .data
            .chunks_exact(self.dimensions)
            .enumerate()
            .map(|(position, vector)| SearchHit::new(position, squared_euclidean(query, vector)))
            .collect();

        // Stable sort: ties stay in insertion order.
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(k);

        debug!(returned = hits.len(), "Search completed");
        Ok(hits)
    }
}

fn validate(vector: &[f32], dimensions: usize) -> Result<()> {
    if vector.len() != dimensions {
        return Err(Error::DimensionMismatch {
            expected: dimensions,
            actual: vector.len(),
        });
    }

    if vector.iter().any(|v| v.is_nan() || v.is_infinite()) {
        return Err(Error::InvalidVector(
            "Vector contains NaN or Inf".to_string(),
        ));
    }

    Ok(())
}

/// Replaceable index holder.
///
/// Starts unbuilt; every successful [`VectorIndex::build`] fully replaces the
/// previous contents. A failed build leaves the previous index in place.
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    current: Option<FlatIndex>,
}

impl VectorIndex {
    /// Create an unbuilt index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the index contents with `vectors`.
    ///
    /// Returns the number of stored vectors.
    pub fn build(&mut self, vectors: Vec<Vec<f32>>) -> Result<usize> {
        let index = FlatIndex::build(vectors)?;
        let len = index.len();
        self.current = Some(index);
        Ok(len)
    }

    /// Search the current index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexNotBuilt`] before the first successful build.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        self.current
            .as_ref()
            .ok_or(Error::IndexNotBuilt)?
            .search(query, k)
    }

    /// Check whether an index has been built.
    pub fn is_built(&self) -> bool {
        self.current.is_some()
    }

    /// Number of stored vectors (0 when unbuilt).
    pub fn len(&self) -> usize {
        self.current.as_ref().map_or(0, FlatIndex::len)
    }

    /// Check if the index holds no vectors.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Vector dimensions of the current index, if built.
    pub fn dimensions(&self) -> Option<usize> {
        self.current.as_ref().map(FlatIndex::dimensions)
    }
}
