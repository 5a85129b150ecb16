//! Retrieval engine.
//!
//! Builds an exact L2 index over the chunks of one text body and answers
//! top-k similarity queries against it. The engine is a two-state machine:
//!
//! ```text
//! EMPTY --build ok--> READY --build ok--> READY (replaced)
//!   |                   |
//!   +--build err--> EMPTY  +--query--> READY
//! ```
//!
//! Each successful build produces a fresh, immutable [`IndexSnapshot`] with
//! a higher version that replaces the previous one wholesale. A failed build
//! leaves the current state untouched. Querying an empty engine fails with
//! [`AppError::NotReady`].

use super::{unsupported, Agent};
use crate::protocol::{components, Envelope, MessageType, Payload};
use crate::rag::chunker::TextChunker;
use crate::rag::embeddings::{check_batch, Embedder};
use crate::types::{AppError, Result};
use async_trait::async_trait;
use docqa_vector::FlatIndex;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Status string reported in `CONTEXT_INDEX_BUILT`.
pub const INDEX_BUILT_STATUS: &str = "Index successfully built";

/// Chunking and search parameters of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Window length in characters.
    pub chunk_size: usize,
    /// Characters shared by consecutive windows.
    pub chunk_overlap: usize,
    /// Results returned when a query does not specify `top_k`.
    pub default_top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 100,
            default_top_k: 8,
        }
    }
}

/// Immutable result of one successful index build.
#[derive(Debug)]
pub struct IndexSnapshot {
    version: u64,
    chunks: Vec<String>,
    index: FlatIndex,
}

impl IndexSnapshot {
    /// Build number, starting at 1 and increasing with every rebuild.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Indexed chunks, in position order.
    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.index.dimensions()
    }

    /// Nearest chunks to `query`, closest first.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<String>> {
        let hits = self.index.search(query, k)?;
        Ok(hits
            .into_iter()
            .filter_map(|hit| self.chunks.get(hit.position).cloned())
            .collect())
    }
}

/// Current engine state.
#[derive(Debug, Clone, Default)]
pub enum IndexState {
    /// No index has been built yet.
    #[default]
    Empty,
    /// An index is available for queries.
    Ready(Arc<IndexSnapshot>),
}

/// Summary of the engine state, suitable for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EngineStatus {
    Empty,
    Ready {
        version: u64,
        num_chunks: usize,
        dimensions: usize,
    },
}

#[derive(Debug, Default)]
struct EngineState {
    current: IndexState,
    builds: u64,
}

/// The retrieval agent: chunker + embedder + vector index.
pub struct RetrievalAgent {
    config: RetrievalConfig,
    chunker: TextChunker,
    embedder: Arc<dyn Embedder>,
    state: Mutex<EngineState>,
}

impl RetrievalAgent {
    /// Create an engine in the `EMPTY` state.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidInput`] for an invalid chunking policy or a
    /// zero `default_top_k`.
    pub fn new(config: RetrievalConfig, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let chunker = TextChunker::new(config.chunk_size, config.chunk_overlap)?;
        if config.default_top_k == 0 {
            return Err(AppError::InvalidInput(
                "default_top_k must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            config,
            chunker,
            embedder,
            state: Mutex::new(EngineState::default()),
        })
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Chunk, embed and index `text`, replacing any previous index.
    ///
    /// Returns the number of indexed chunks.
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub fn build_index(&self, text: &str) -> Result<usize> {
        let mut state = self.state.lock();

        let chunks = self.chunker.chunk(text);
        if chunks.is_empty() {
            return Err(AppError::EmptyInput(
                "Empty text received for indexing.".to_string(),
            ));
        }

        let vectors = self.embedder.encode(&chunks)?;
        check_batch(&vectors, chunks.len())?;
        let index = FlatIndex::build(vectors)?;

        state.builds += 1;
        let snapshot = IndexSnapshot {
            version: state.builds,
            chunks,
            index,
        };
        let num_chunks = snapshot.len();
        info!(
            num_chunks,
            version = snapshot.version,
            dimensions = snapshot.dimensions(),
            model = self.embedder.model_name(),
            "Index built"
        );
        state.current = IndexState::Ready(Arc::new(snapshot));

        Ok(num_chunks)
    }

    /// Return the chunks nearest to `query`, closest first.
    ///
    /// `top_k` defaults to the configured value and is clamped to the
    /// number of indexed chunks.
    #[instrument(skip(self, query))]
    pub fn retrieve(&self, query: &str, top_k: Option<usize>) -> Result<Vec<String>> {
        let state = self.state.lock();
        let snapshot = match &state.current {
            IndexState::Empty => return Err(AppError::NotReady),
            IndexState::Ready(snapshot) => snapshot,
        };

        let k = top_k.unwrap_or(self.config.default_top_k);
        if k == 0 {
            return Err(AppError::InvalidPayload(
                "QUERY_REQUEST: top_k must be at least 1".to_string(),
            ));
        }

        let vector = self.embedder.encode_one(query)?;
        let chunks = snapshot.search(&vector, k)?;
        debug!(k, returned = chunks.len(), version = snapshot.version, "Retrieved chunks");
        Ok(chunks)
    }

    /// The current state, shared with any in-flight readers.
    pub fn snapshot(&self) -> IndexState {
        self.state.lock().current.clone()
    }

    pub fn state(&self) -> EngineStatus {
        match &self.state.lock().current {
            IndexState::Empty => EngineStatus::Empty,
            IndexState::Ready(snapshot) => EngineStatus::Ready {
                version: snapshot.version,
                num_chunks: snapshot.len(),
                dimensions: snapshot.dimensions(),
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state.lock().current, IndexState::Ready(_))
    }

    /// Process one envelope synchronously.
    pub fn process(&self, message: Envelope) -> Envelope {
        let kind = message.message_type();
        let Envelope {
            trace_id, payload, ..
        } = message;

        match payload {
            Payload::ContextDocumentParsed { text, filename } => match self.build_index(&text) {
                Ok(num_chunks) => Envelope::new(
                    components::RETRIEVAL,
                    components::UI,
                    trace_id,
                    Payload::ContextIndexBuilt {
                        status: INDEX_BUILT_STATUS.to_string(),
                        num_chunks,
                    },
                ),
                Err(e) => self.reply_error(trace_id, &e, None, Some(filename)),
            },
            Payload::QueryRequest { query, top_k } => match self.retrieve(&query, top_k) {
                Ok(top_chunks) => Envelope::new(
                    components::RETRIEVAL,
                    components::GENERATION,
                    trace_id,
                    Payload::ContextResponse { top_chunks, query },
                ),
                Err(e) => self.reply_error(trace_id, &e, Some(query), None),
            },
            _ => self.reply_error(trace_id, &unsupported(kind), None, None),
        }
    }

    fn reply_error(
        &self,
        trace_id: String,
        error: &AppError,
        query: Option<String>,
        filename: Option<String>,
    ) -> Envelope {
        warn!(trace_id = %trace_id, kind = error.kind(), error = %error, "Retrieval failed");
        Envelope::new(
            components::RETRIEVAL,
            components::UI,
            trace_id,
            Payload::ContextError {
                error: error.to_string(),
                query,
                filename,
            },
        )
    }
}

#[async_trait]
impl Agent for RetrievalAgent {
    fn name(&self) -> &'static str {
        components::RETRIEVAL
    }

    fn accepts(&self) -> &'static [MessageType] {
        &[MessageType::ContextDocumentParsed, MessageType::QueryRequest]
    }

    async fn handle(&self, message: Envelope) -> Envelope {
        self.process(message)
    }
}
