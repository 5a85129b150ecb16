//! # docqa - Document Question Answering
//!
//! Ingests documents, splits them into overlapping chunks, indexes the chunk
//! embeddings for exact L2 similarity search and answers questions with an
//! LLM using the most relevant chunks as context.
//!
//! ## Overview
//!
//! docqa can be used in two ways:
//!
//! 1. **As a command line tool** - Run the `docqa` binary
//! 2. **As a library** - Drive the agents or the [`Pipeline`] from your own code
//!
//! ### Basic Example
//!
//! ```rust,ignore
//! use docqa::{DocqaConfig, Pipeline};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DocqaConfig::load_or_default("docqa.toml")?;
//!     let pipeline = Pipeline::from_config(&config).await?;
//!
//!     let report = pipeline.ingest_files(&["handbook.md", "prices.csv"]).await?;
//!     println!("indexed {} chunks", report.num_chunks);
//!
//!     let answer = pipeline.ask("How much does shipping cost?", Some(3)).await?;
//!     println!("{}", answer.answer);
//!     Ok(())
//! }
//! ```
//!
//! ### Message-level Example
//!
//! Every agent speaks the same envelope protocol, so a single component can
//! be driven directly with JSON:
//!
//! ```rust
//! use docqa::agents::{Agent, RetrievalAgent, RetrievalConfig};
//! use docqa::rag::HashEmbedder;
//! use std::sync::Arc;
//!
//! # tokio_test_block(async {
//! let engine = RetrievalAgent::new(
//!     RetrievalConfig::default(),
//!     Arc::new(HashEmbedder::new(64).unwrap()),
//! )
//! .unwrap();
//!
//! let reply = engine
//!     .handle_value(serde_json::json!({
//!         "sender": "UI",
//!         "receiver": "RetrievalAgent",
//!         "type": "QUERY_REQUEST",
//!         "trace_id": "t-1",
//!         "payload": {"query": "anything"}
//!     }))
//!     .await;
//!
//! assert!(reply.is_error());
//! assert_eq!(reply.trace_id, "t-1");
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `ollama` | Ollama local inference (default) |
//! | `local-embeddings` | fastembed ONNX sentence embeddings |
//!
//! ## Modules
//!
//! - [`protocol`] - Message envelopes exchanged between agents
//! - [`agents`] - Ingestion, retrieval and answer generation agents
//! - [`rag`] - Chunking and embedding
//! - [`llm`] - LLM client implementations
//! - [`pipeline`] - Session orchestration across the agents
//! - [`types`] - Error handling
//! - [`utils`] - Configuration

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// Ingestion, retrieval and answer generation agents.
pub mod agents;
/// Command line interface definitions.
pub mod cli;
/// LLM provider clients and abstractions.
pub mod llm;
/// Session orchestration.
pub mod pipeline;
/// Message envelope protocol.
pub mod protocol;
/// Chunking and embedding.
pub mod rag;
/// Core error types.
pub mod types;
/// Configuration utilities (TOML).
pub mod utils;

// Re-export commonly used types
pub use agents::{Agent, IngestionAgent, LLMResponseAgent, RetrievalAgent, RetrievalConfig};
pub use llm::{LLMClient, Provider};
pub use pipeline::{Answer, IngestReport, Pipeline};
pub use protocol::{Envelope, MessageType, Payload};
pub use rag::{Embedder, HashEmbedder, TextChunker};
pub use types::{AppError, Result};
pub use utils::toml_config::DocqaConfig;
