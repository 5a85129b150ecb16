//! Session orchestration.
//!
//! A [`Pipeline`] wires the three agents together and drives them with
//! envelopes, the way an interactive front-end would:
//!
//! 1. `FILE_UPLOAD` per file to the ingestion agent. A failing file is
//!    recorded and skipped.
//! 2. One `CONTEXT_DOCUMENT_PARSED` with every parsed text to the retrieval
//!    agent, which (re)builds the index.
//! 3. Per question: `QUERY_REQUEST` to retrieval, then the resulting
//!    `CONTEXT_RESPONSE` to the answer generator.
//!
//! All messages of a session share one `trace_id`.

use crate::agents::{Agent, EngineStatus, IngestionAgent, LLMResponseAgent, RetrievalAgent};
use crate::protocol::{components, new_trace_id, Envelope, Payload};
use crate::rag::embeddings;
use crate::types::{AppError, Result};
use crate::utils::toml_config::DocqaConfig;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{error, info, instrument, warn};

/// Filename reported for the combined text of an upload batch.
pub const COMBINED_FILENAME: &str = "all_documents";

/// A file that could not be ingested.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Outcome of [`Pipeline::ingest_files`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestReport {
    /// Names of the files that were parsed, in upload order.
    pub parsed: Vec<String>,
    pub failures: Vec<FileFailure>,
    /// Chunks in the rebuilt index.
    pub num_chunks: usize,
}

/// Answer to one question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub answer: String,
    pub query: String,
    pub used_chunks: Vec<String>,
    pub trace_id: String,
}

/// One document QA session.
pub struct Pipeline {
    trace_id: String,
    ingestion: IngestionAgent,
    retrieval: RetrievalAgent,
    generation: Option<LLMResponseAgent>,
}

impl Pipeline {
    pub fn new(
        ingestion: IngestionAgent,
        retrieval: RetrievalAgent,
        generation: Option<LLMResponseAgent>,
    ) -> Self {
        Self {
            trace_id: new_trace_id(),
            ingestion,
            retrieval,
            generation,
        }
    }

    /// Full pipeline, including an LLM client for answer generation.
    pub async fn from_config(config: &DocqaConfig) -> Result<Self> {
        let mut pipeline = Self::retrieval_only(config)?;
        let client = config.llm.provider().create_client().await?;
        pipeline.generation = Some(LLMResponseAgent::new(client));
        Ok(pipeline)
    }

    /// Pipeline without answer generation; [`ask`](Self::ask) will fail.
    pub fn retrieval_only(config: &DocqaConfig) -> Result<Self> {
        let embedder = embeddings::from_config(&config.embedding)?;
        let retrieval = RetrievalAgent::new(config.retrieval(), embedder)?;
        Ok(Self::new(IngestionAgent::new(), retrieval, None))
    }

    /// Use a fixed session id instead of a generated one.
    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = trace_id.into();
        self
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    pub fn status(&self) -> EngineStatus {
        self.retrieval.state()
    }

    /// Parse `paths` and rebuild the index from everything that parsed.
    ///
    /// # Errors
    ///
    /// - [`AppError::EmptyInput`] when no file produced any text.
    /// - [`AppError::Downstream`] when the retrieval agent rejects the text.
    #[instrument(skip_all, fields(trace_id = %self.trace_id, files = paths.len()))]
    pub async fn ingest_files<P: AsRef<Path>>(&self, paths: &[P]) -> Result<IngestReport> {
        let mut texts = Vec::new();
        let mut parsed = Vec::new();
        let mut failures = Vec::new();

        for path in paths {
            let path = path.as_ref();
            let upload = Envelope::new(
                components::UI,
                components::INGESTION,
                self.trace_id.as_str(),
                Payload::FileUpload {
                    file_path: path.to_path_buf(),
                },
            );

            match self.ingestion.handle(upload).await.payload {
                Payload::ContextDocumentParsed { text, filename } => {
                    info!(filename = %filename, "Ingested document");
                    texts.push(text);
                    parsed.push(filename);
                }
                other => {
                    let error = describe(&other);
                    warn!(path = %path.display(), error = %error, "Skipping document");
                    failures.push(FileFailure {
                        path: path.to_path_buf(),
                        error,
                    });
                }
            }
        }

        if texts.iter().all(|t| t.trim().is_empty()) {
            return Err(AppError::EmptyInput(with_skipped(
                "No valid chunks found in the uploaded documents".to_string(),
                &failures,
            )));
        }

        let parsed_message = Envelope::new(
            components::INGESTION,
            components::RETRIEVAL,
            self.trace_id.as_str(),
            Payload::ContextDocumentParsed {
                text: texts.join("\n"),
                filename: COMBINED_FILENAME.to_string(),
            },
        );

        match self.retrieval.handle(parsed_message).await.payload {
            Payload::ContextIndexBuilt { num_chunks, .. } => Ok(IngestReport {
                parsed,
                failures,
                num_chunks,
            }),
            other => {
                let error = with_skipped(describe(&other), &failures);
                error!(error = %error, "Index rebuild rejected");
                Err(AppError::Downstream(error))
            }
        }
    }

    /// Retrieve the chunks most relevant to `query`, without generating an answer.
    #[instrument(skip_all, fields(trace_id = %self.trace_id))]
    pub async fn retrieve(&self, query: &str, top_k: Option<usize>) -> Result<Vec<String>> {
        match self.query(query, top_k).await.payload {
            Payload::ContextResponse { top_chunks, .. } => Ok(top_chunks),
            other => Err(AppError::Downstream(describe(&other))),
        }
    }

    /// Answer `query` from the indexed documents.
    #[instrument(skip_all, fields(trace_id = %self.trace_id))]
    pub async fn ask(&self, query: &str, top_k: Option<usize>) -> Result<Answer> {
        let generation = self.generation.as_ref().ok_or_else(|| {
            AppError::Config("No LLM configured; answer generation is unavailable".to_string())
        })?;

        let context = self.query(query, top_k).await;
        if let Some(error) = context.error_message() {
            return Err(AppError::Downstream(error.to_string()));
        }

        let reply = generation.handle(context).await;
        let trace_id = reply.trace_id;
        match reply.payload {
            Payload::FinalAnswer {
                answer,
                query,
                used_chunks,
            } => Ok(Answer {
                answer,
                query,
                used_chunks,
                trace_id,
            }),
            other => Err(AppError::Downstream(describe(&other))),
        }
    }

    async fn query(&self, query: &str, top_k: Option<usize>) -> Envelope {
        let request = Envelope::new(
            components::UI,
            components::RETRIEVAL,
            self.trace_id.as_str(),
            Payload::QueryRequest {
                query: query.to_string(),
                top_k,
            },
        );
        self.retrieval.handle(request).await
    }
}

/// Append the files skipped during ingestion to an error message.
fn with_skipped(message: String, failures: &[FileFailure]) -> String {
    if failures.is_empty() {
        return message;
    }
    let skipped = failures
        .iter()
        .map(|f| format!("{} ({})", f.path.display(), f.error))
        .collect::<Vec<_>>()
        .join("; ");
    format!("{} [skipped: {}]", message, skipped)
}

/// Error text of a reply that was not the expected kind.
fn describe(payload: &Payload) -> String {
    match payload {
        Payload::ContextError { error, .. } => error.clone(),
        other => format!("Unexpected {} reply", other.message_type()),
    }
}
