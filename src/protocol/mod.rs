//! Message envelope protocol shared by all agents.
//!
//! Every request and response between the UI, the ingestion agent, the
//! retrieval engine and the answer generator is an [`Envelope`]:
//!
//! ```json
//! {
//!   "sender": "IngestionAgent",
//!   "receiver": "RetrievalAgent",
//!   "type": "CONTEXT_DOCUMENT_PARSED",
//!   "trace_id": "6f1c...",
//!   "payload": { "filename": "notes.md", "text": "..." }
//! }
//! ```
//!
//! The `type` field selects one variant of the closed [`Payload`] enum.
//! Inbound JSON is validated at the boundary ([`Envelope::from_value`]):
//! unknown kinds and malformed payloads fail with a specific error instead
//! of falling back to defaults.

use crate::types::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use uuid::Uuid;

/// Well-known component identifiers used in `sender` / `receiver`.
pub mod components {
    /// The interactive front-end or CLI driving the pipeline.
    pub const UI: &str = "UI";
    /// Turns uploaded files into plain text.
    pub const INGESTION: &str = "IngestionAgent";
    /// Builds the vector index and answers similarity queries.
    pub const RETRIEVAL: &str = "RetrievalAgent";
    /// Composes the final answer with an LLM.
    pub const GENERATION: &str = "LLMResponseAgent";
}

// ============= Message Kinds =============

/// The fixed set of message kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    FileUpload,
    ContextDocumentParsed,
    QueryRequest,
    ContextIndexBuilt,
    ContextResponse,
    FinalAnswer,
    ContextError,
}

impl MessageType {
    /// All kinds, in pipeline order.
    pub const ALL: [MessageType; 7] = [
        MessageType::FileUpload,
        MessageType::ContextDocumentParsed,
        MessageType::QueryRequest,
        MessageType::ContextIndexBuilt,
        MessageType::ContextResponse,
        MessageType::FinalAnswer,
        MessageType::ContextError,
    ];

    /// Wire name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::FileUpload => "FILE_UPLOAD",
            MessageType::ContextDocumentParsed => "CONTEXT_DOCUMENT_PARSED",
            MessageType::QueryRequest => "QUERY_REQUEST",
            MessageType::ContextIndexBuilt => "CONTEXT_INDEX_BUILT",
            MessageType::ContextResponse => "CONTEXT_RESPONSE",
            MessageType::FinalAnswer => "FINAL_ANSWER",
            MessageType::ContextError => "CONTEXT_ERROR",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        MessageType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| AppError::UnknownMessageType(s.to_string()))
    }
}

// ============= Payloads =============

/// Kind-specific message body.
///
/// Serialized adjacently tagged, so a payload alone renders as
/// `{"type": "...", "payload": {...}}` and flattens into [`Envelope`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Payload {
    FileUpload {
        file_path: PathBuf,
    },
    ContextDocumentParsed {
        text: String,
        filename: String,
    },
    QueryRequest {
        query: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        top_k: Option<usize>,
    },
    ContextIndexBuilt {
        status: String,
        num_chunks: usize,
    },
    ContextResponse {
        top_chunks: Vec<String>,
        query: String,
    },
    FinalAnswer {
        answer: String,
        query: String,
        used_chunks: Vec<String>,
    },
    ContextError {
        error: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        query: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filename: Option<String>,
    },
}

impl Payload {
    /// The message kind carried by this payload.
    pub fn message_type(&self) -> MessageType {
        match self {
            Payload::FileUpload { .. } => MessageType::FileUpload,
            Payload::ContextDocumentParsed { .. } => MessageType::ContextDocumentParsed,
            Payload::QueryRequest { .. } => MessageType::QueryRequest,
            Payload::ContextIndexBuilt { .. } => MessageType::ContextIndexBuilt,
            Payload::ContextResponse { .. } => MessageType::ContextResponse,
            Payload::FinalAnswer { .. } => MessageType::FinalAnswer,
            Payload::ContextError { .. } => MessageType::ContextError,
        }
    }

    /// Error payload without echoed fields.
    pub fn error(error: impl Into<String>) -> Self {
        Payload::ContextError {
            error: error.into(),
            query: None,
            filename: None,
        }
    }

    fn validate(&self) -> Result<()> {
        if let Payload::QueryRequest { top_k: Some(0), .. } = self {
            return Err(AppError::InvalidPayload(
                "QUERY_REQUEST: top_k must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

// ============= Envelope =============

/// Unvalidated envelope as it arrives on the wire.
///
/// Every field is optional or loosely typed so that the routing metadata
/// (notably `trace_id`) can still be recovered from a malformed message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEnvelope {
    #[serde(default)]
    pub sender: String,
    #[serde(default)]
    pub receiver: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub trace_id: Option<String>,
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// A validated protocol message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawEnvelope")]
pub struct Envelope {
    /// Origin component identifier.
    pub sender: String,
    /// Destination component identifier.
    pub receiver: String,
    /// Correlation id, stable across a request/response chain.
    pub trace_id: String,
    /// Kind-specific body; also determines the `type` field on the wire.
    #[serde(flatten)]
    pub payload: Payload,
}

impl TryFrom<RawEnvelope> for Envelope {
    type Error = AppError;

    fn try_from(raw: RawEnvelope) -> Result<Self> {
        let kind: MessageType = raw.kind.parse()?;

        let body = match raw.payload {
            serde_json::Value::Null => serde_json::Value::Object(Default::default()),
            other => other,
        };
        let payload: Payload = serde_json::from_value(serde_json::json!({
            "type": kind,
            "payload": body,
        }))
        .map_err(|e| AppError::InvalidPayload(format!("{}: {}", kind, e)))?;
        payload.validate()?;

        Ok(Self {
            sender: raw.sender,
            receiver: raw.receiver,
            trace_id: raw.trace_id.unwrap_or_else(new_trace_id),
            payload,
        })
    }
}

impl Envelope {
    /// Create an envelope.
    pub fn new(
        sender: impl Into<String>,
        receiver: impl Into<String>,
        trace_id: impl Into<String>,
        payload: Payload,
    ) -> Self {
        Self {
            sender: sender.into(),
            receiver: receiver.into(),
            trace_id: trace_id.into(),
            payload,
        }
    }

    /// Create a `CONTEXT_ERROR` envelope describing `error`.
    pub fn error(
        sender: impl Into<String>,
        receiver: impl Into<String>,
        trace_id: impl Into<String>,
        error: &AppError,
    ) -> Self {
        Self::new(sender, receiver, trace_id, Payload::error(error.to_string()))
    }

    /// Parse and validate an envelope from a JSON value.
    ///
    /// # Errors
    ///
    /// - [`AppError::UnknownMessageType`] when `type` is not a known kind.
    /// - [`AppError::InvalidPayload`] when the envelope or its payload is malformed.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let raw: RawEnvelope = serde_json::from_value(value)
            .map_err(|e| AppError::InvalidPayload(format!("envelope: {}", e)))?;
        Self::try_from(raw)
    }

    /// Parse and validate an envelope from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| AppError::InvalidPayload(format!("envelope: {}", e)))?;
        Self::from_value(value)
    }

    /// Serialize to a JSON value with the five wire fields.
    pub fn to_value(&self) -> serde_json::Value {
        // Infallible: every field is a string, number, sequence or map.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// The message kind.
    pub fn message_type(&self) -> MessageType {
        self.payload.message_type()
    }

    /// Check whether this is a `CONTEXT_ERROR` envelope.
    pub fn is_error(&self) -> bool {
        matches!(self.payload, Payload::ContextError { .. })
    }

    /// The error description, if this is a `CONTEXT_ERROR` envelope.
    pub fn error_message(&self) -> Option<&str> {
        match &self.payload {
            Payload::ContextError { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Generate a fresh correlation id.
pub fn new_trace_id() -> String {
    Uuid::new_v4().to_string()
}

/// Best-effort `trace_id` extraction from an arbitrary JSON message.
///
/// Falls back to a fresh id when the field is missing or not a string.
pub fn trace_id_of(value: &serde_json::Value) -> String {
    value
        .get("trace_id")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or_else(new_trace_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_type_round_trips_wire_names() {
        for kind in MessageType::ALL {
            assert_eq!(kind.as_str().parse::<MessageType>().unwrap(), kind);
            assert_eq!(
                serde_json::to_value(kind).unwrap(),
                json!(kind.as_str())
            );
        }
    }

    #[test]
    fn test_unknown_message_type() {
        let err = "FOO".parse::<MessageType>().unwrap_err();
        assert!(matches!(err, AppError::UnknownMessageType(ref t) if t == "FOO"));
    }

    #[test]
    fn test_envelope_wire_shape() {
        let envelope = Envelope::new(
            components::RETRIEVAL,
            components::UI,
            "trace-1",
            Payload::ContextIndexBuilt {
                status: "Index successfully built".to_string(),
                num_chunks: 3,
            },
        );

        let value = envelope.to_value();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 5);
        assert_eq!(value["sender"], "RetrievalAgent");
        assert_eq!(value["receiver"], "UI");
        assert_eq!(value["type"], "CONTEXT_INDEX_BUILT");
        assert_eq!(value["trace_id"], "trace-1");
        assert_eq!(value["payload"]["num_chunks"], 3);
    }

    #[test]
    fn test_parse_query_request_with_optional_top_k() {
        let envelope = Envelope::from_value(json!({
            "sender": "UI",
            "receiver": "RetrievalAgent",
            "type": "QUERY_REQUEST",
            "trace_id": "t",
            "payload": {"query": "what?"}
        }))
        .unwrap();

        assert_eq!(
            envelope.payload,
            Payload::QueryRequest {
                query: "what?".to_string(),
                top_k: None
            }
        );
    }

    #[test]
    fn test_parse_rejects_unknown_type() {
        let err = Envelope::from_value(json!({
            "sender": "UI",
            "receiver": "RetrievalAgent",
            "type": "FOO",
            "trace_id": "t",
            "payload": {}
        }))
        .unwrap_err();

        assert_eq!(err.to_string(), "Unknown message type: FOO");
    }

    #[test]
    fn test_parse_rejects_missing_payload_field() {
        let err = Envelope::from_value(json!({
            "type": "CONTEXT_DOCUMENT_PARSED",
            "trace_id": "t",
            "payload": {"filename": "a.txt"}
        }))
        .unwrap_err();

        assert!(matches!(err, AppError::InvalidPayload(_)));
        assert!(err.to_string().contains("CONTEXT_DOCUMENT_PARSED"));
    }

    #[test]
    fn test_parse_rejects_zero_top_k() {
        let err = Envelope::from_value(json!({
            "type": "QUERY_REQUEST",
            "trace_id": "t",
            "payload": {"query": "q", "top_k": 0}
        }))
        .unwrap_err();

        assert!(matches!(err, AppError::InvalidPayload(_)));
    }

    #[test]
    fn test_missing_trace_id_gets_generated() {
        let envelope = Envelope::from_value(json!({
            "type": "FILE_UPLOAD",
            "payload": {"file_path": "docs/a.txt"}
        }))
        .unwrap();

        assert!(Uuid::parse_str(&envelope.trace_id).is_ok());
    }

    #[test]
    fn test_json_round_trip_through_serde() {
        let envelope = Envelope::new(
            components::UI,
            components::INGESTION,
            "t",
            Payload::FileUpload {
                file_path: PathBuf::from("docs/a.md"),
            },
        );

        let json = serde_json::to_string(&envelope).unwrap();
        let parsed: Envelope = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, envelope);
    }

    #[test]
    fn test_error_envelope() {
        let envelope = Envelope::error(
            components::RETRIEVAL,
            components::UI,
            "t",
            &AppError::NotReady,
        );

        assert!(envelope.is_error());
        assert_eq!(envelope.message_type(), MessageType::ContextError);
        assert_eq!(
            envelope.error_message(),
            Some("Index not built yet. Cannot perform retrieval.")
        );
        assert!(envelope.to_value()["payload"].get("query").is_none());
    }

    #[test]
    fn test_trace_id_of_falls_back() {
        assert_eq!(trace_id_of(&json!({"trace_id": "abc"})), "abc");
        assert!(Uuid::parse_str(&trace_id_of(&json!({"trace_id": 5}))).is_ok());
    }
}
