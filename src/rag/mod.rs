//! Text preparation for retrieval.
//!
//! - [`rag::chunker`](crate::rag::chunker) - Overlapping fixed-size character windows
//! - [`rag::embeddings`](crate::rag::embeddings) - The [`Embedder`](embeddings::Embedder)
//!   boundary and built-in embedders
//!
//! Indexing and search live in the `docqa-vector` crate; the retrieval
//! engine in [`agents::retrieval`](crate::agents::retrieval) ties the three together.

pub mod chunker;
pub mod embeddings;

pub use chunker::TextChunker;
pub use embeddings::{Embedder, HashEmbedder};
