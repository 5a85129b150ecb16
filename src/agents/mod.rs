//! Pipeline agents.
//!
//! Each agent consumes one [`Envelope`] and answers with exactly one
//! [`Envelope`]. Failures never escape as `Err`: they come back as
//! `CONTEXT_ERROR` replies carrying the request's `trace_id`.
//!
//! | Agent | Accepts | Replies |
//! |-------|---------|---------|
//! | [`IngestionAgent`] | `FILE_UPLOAD` | `CONTEXT_DOCUMENT_PARSED` |
//! | [`RetrievalAgent`] | `CONTEXT_DOCUMENT_PARSED`, `QUERY_REQUEST` | `CONTEXT_INDEX_BUILT`, `CONTEXT_RESPONSE` |
//! | [`LLMResponseAgent`] | `CONTEXT_RESPONSE` | `FINAL_ANSWER` |

pub mod generation;
pub mod ingestion;
pub mod retrieval;

use crate::protocol::{components, trace_id_of, Envelope, MessageType};
use crate::types::AppError;
use async_trait::async_trait;

pub use generation::LLMResponseAgent;
pub use ingestion::{DocumentParser, IngestionAgent};
pub use retrieval::{EngineStatus, RetrievalAgent, RetrievalConfig};

/// Base trait for all agents
#[async_trait]
pub trait Agent: Send + Sync {
    /// Component identifier used as `sender` on replies.
    fn name(&self) -> &'static str;

    /// Message kinds this agent handles.
    fn accepts(&self) -> &'static [MessageType];

    /// Process one validated envelope.
    async fn handle(&self, message: Envelope) -> Envelope;

    /// Validate a raw JSON message, then process it.
    ///
    /// Validation failures become a `CONTEXT_ERROR` addressed to the UI,
    /// keeping the inbound `trace_id` when one can be read.
    async fn handle_value(&self, value: serde_json::Value) -> Envelope {
        let trace_id = trace_id_of(&value);
        match Envelope::from_value(value) {
            Ok(message) => self.handle(message).await,
            Err(e) => {
                tracing::warn!(agent = self.name(), error = %e, "Rejected inbound message");
                Envelope::error(self.name(), components::UI, trace_id, &e)
            }
        }
    }
}

/// Error for a well-formed envelope sent to an agent that does not handle its kind.
pub(crate) fn unsupported(kind: MessageType) -> AppError {
    AppError::UnknownMessageType(kind.to_string())
}
