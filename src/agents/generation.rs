//! Answer generation agent.
//!
//! Consumes a `CONTEXT_RESPONSE`, asks the LLM to answer the query from the
//! retrieved chunks and replies with `FINAL_ANSWER`.

use super::{unsupported, Agent};
use crate::llm::LLMClient;
use crate::protocol::{components, Envelope, MessageType, Payload};
use crate::types::AppError;
use async_trait::async_trait;
use tracing::{info, instrument, warn};

/// Separator placed between context chunks in the prompt.
pub const CHUNK_SEPARATOR: &str = "\n---\n";

/// Render the question-answering prompt.
pub fn build_prompt(query: &str, chunks: &[String]) -> String {
    let context = chunks.join(CHUNK_SEPARATOR);
    format!(
        "You are a helpful assistant. Use the context below to answer the user's question.\n\n\
         Context:\n{}\n\nQuestion: {}\nAnswer:",
        context, query
    )
}

/// The answer generation agent.
pub struct LLMResponseAgent {
    llm: Box<dyn LLMClient>,
}

impl LLMResponseAgent {
    pub fn new(llm: Box<dyn LLMClient>) -> Self {
        Self { llm }
    }

    pub fn model_name(&self) -> &str {
        self.llm.model_name()
    }

    #[instrument(skip_all, fields(trace_id = %trace_id, chunks = top_chunks.len()))]
    async fn answer(&self, trace_id: String, query: String, top_chunks: Vec<String>) -> Envelope {
        let prompt = build_prompt(&query, &top_chunks);

        match self.llm.generate(&prompt).await {
            Ok(answer) => {
                info!(model = self.llm.model_name(), "Answer generated");
                Envelope::new(
                    components::GENERATION,
                    components::UI,
                    trace_id,
                    Payload::FinalAnswer {
                        answer,
                        query,
                        used_chunks: top_chunks,
                    },
                )
            }
            Err(e) => {
                warn!(error = %e, "Answer generation failed");
                Envelope::new(
                    components::GENERATION,
                    components::UI,
                    trace_id,
                    Payload::ContextError {
                        error: e.to_string(),
                        query: Some(query),
                        filename: None,
                    },
                )
            }
        }
    }
}

#[async_trait]
impl Agent for LLMResponseAgent {
    fn name(&self) -> &'static str {
        components::GENERATION
    }

    fn accepts(&self) -> &'static [MessageType] {
        &[MessageType::ContextResponse]
    }

    async fn handle(&self, message: Envelope) -> Envelope {
        let kind = message.message_type();
        match message.payload {
            Payload::ContextResponse { top_chunks, query } => {
                self.answer(message.trace_id, query, top_chunks).await
            }
            _ => {
                let e: AppError = unsupported(kind);
                Envelope::error(components::GENERATION, components::UI, message.trace_id, &e)
            }
        }
    }
}
