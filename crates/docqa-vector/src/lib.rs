//! # docqa-vector
//!
//! An exact, in-memory vector index with squared Euclidean (L2) ranking.
//!
//! ## Features
//!
//! - **Exact search**: brute-force scan, no approximation error
//! - **Stable ranking**: equal distances keep insertion order
//! - **Replace-only lifecycle**: every build swaps in a complete new index
//!
//! ## Quick Start
//!
//! ```rust
//! use docqa_vector::{FlatIndex, VectorIndex};
//!
//! let index = FlatIndex::build(vec![vec![0.0, 0.0], vec![1.0, 1.0]])?;
//! let hits = index.search(&[0.9, 0.9], 1)?;
//! assert_eq!(hits[0].position, 1);
//!
//! let mut holder = VectorIndex::new();
//! assert!(holder.search(&[0.0, 0.0], 1).is_err());
//! holder.build(vec![vec![0.0, 0.0]])?;
//! assert_eq!(holder.len(), 1);
//! # Ok::<(), docqa_vector::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod distance;
pub mod error;
pub mod index;
pub mod types;

// Re-exports for convenience
pub use error::{Error, Result};
pub use index::{FlatIndex, VectorIndex};
pub use types::SearchHit;
