// ============= Error Types =============

/// Failure kinds of the document QA pipeline.
///
/// Every agent boundary converts these into a `CONTEXT_ERROR` envelope
/// instead of returning them to the caller.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    EmptyInput(String),

    #[error("Index not built yet. Cannot perform retrieval.")]
    NotReady,

    #[error("Unknown message type: {0}")]
    UnknownMessageType(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Vector index error: {0}")]
    Vector(#[from] docqa_vector::Error),

    #[error("{0}")]
    Downstream(String),

    #[error("LLM error: {0}")]
    LLM(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Stable, machine-readable name of the error kind (used in logs).
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::EmptyInput(_) => "empty_input",
            AppError::NotReady => "not_ready",
            AppError::UnknownMessageType(_) => "unknown_message_type",
            AppError::InvalidPayload(_) => "invalid_payload",
            AppError::Embedding(_) => "embedding_failure",
            AppError::Vector(docqa_vector::Error::EmptyInput) => "empty_input",
            AppError::Vector(docqa_vector::Error::IndexNotBuilt) => "not_ready",
            AppError::Vector(_) => "vector_index",
            AppError::Downstream(_) => "downstream",
            AppError::LLM(_) => "llm",
            AppError::FileNotFound(_) => "file_not_found",
            AppError::UnsupportedFileType(_) => "unsupported_file_type",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::Config(_) => "config",
            AppError::Io(_) => "io",
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
