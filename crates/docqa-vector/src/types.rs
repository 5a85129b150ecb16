//! Common types for docqa-vector.

/// A single nearest-neighbor match.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchHit {
    /// Zero-based insertion position of the matched vector.
    pub position: usize,
    /// Squared Euclidean distance to the query (lower is closer).
    pub distance: f32,
}

impl SearchHit {
    /// Create a new hit.
    pub fn new(position: usize, distance: f32) -> Self {
        Self { position, distance }
    }

    /// Plain (non-squared) Euclidean distance to the query.
    pub fn euclidean(&self) -> f32 {
        self.distance.sqrt()
    }
}
