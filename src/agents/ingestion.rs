//! Document ingestion agent.
//!
//! Turns a `FILE_UPLOAD { file_path }` into `CONTEXT_DOCUMENT_PARSED
//! { filename, text }`. Format handling is delegated to a [`DocumentParser`]
//! chosen by the (case-insensitive) file extension.

use super::{unsupported, Agent};
use crate::protocol::{components, Envelope, MessageType, Payload};
use crate::types::{AppError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Extracts plain text from the raw bytes of one document format.
pub trait DocumentParser: Send + Sync {
    fn parse(&self, bytes: &[u8]) -> Result<String>;
}

/// UTF-8 text, decoded lossily when the file contains invalid sequences.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextParser;

impl DocumentParser for PlainTextParser {
    fn parse(&self, bytes: &[u8]) -> Result<String> {
        Ok(match std::str::from_utf8(bytes) {
            Ok(text) => text.to_string(),
            Err(_) => String::from_utf8_lossy(bytes).into_owned(),
        })
    }
}

/// Comma separated values rendered as a left-aligned table.
///
/// The first record is treated as the header. Fields may be quoted with
/// `"`; a doubled quote inside a quoted field is a literal quote.
#[derive(Debug, Clone, Copy)]
pub struct DelimitedParser {
    delimiter: char,
}

impl DelimitedParser {
    pub fn new(delimiter: char) -> Self {
        Self { delimiter }
    }

    fn split_record(&self, line: &str) -> Vec<String> {
        let mut fields = Vec::new();
        let mut field = String::new();
        let mut quoted = false;
        let mut chars = line.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '"' if quoted && chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => quoted = !quoted,
                c if c == self.delimiter && !quoted => {
                    fields.push(field.trim().to_string());
                    field.clear();
                }
                c => field.push(c),
            }
        }
        fields.push(field.trim().to_string());
        fields
    }
}

impl Default for DelimitedParser {
    fn default() -> Self {
        Self::new(',')
    }
}

impl DocumentParser for DelimitedParser {
    fn parse(&self, bytes: &[u8]) -> Result<String> {
        let text = PlainTextParser.parse(bytes)?;
        let rows: Vec<Vec<String>> = text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| self.split_record(line))
            .collect();

        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut widths = vec![0usize; columns];
        for row in &rows {
            for (i, field) in row.iter().enumerate() {
                widths[i] = widths[i].max(field.chars().count());
            }
        }

        let rendered: Vec<String> = rows
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .map(|(i, field)| format!("{:<width$}", field, width = widths[i]))
                    .collect::<Vec<_>>()
                    .join("  ")
                    .trim_end()
                    .to_string()
            })
            .collect();

        Ok(rendered.join("\n"))
    }
}

/// The ingestion agent.
pub struct IngestionAgent {
    parsers: HashMap<String, Arc<dyn DocumentParser>>,
}

impl IngestionAgent {
    /// Agent with the built-in parsers for `txt`, `md` and `csv`.
    pub fn new() -> Self {
        let text: Arc<dyn DocumentParser> = Arc::new(PlainTextParser);
        Self::empty()
            .with_parser("txt", Arc::clone(&text))
            .with_parser("md", text)
            .with_parser("csv", Arc::new(DelimitedParser::default()))
    }

    /// Agent with no parsers registered.
    pub fn empty() -> Self {
        Self {
            parsers: HashMap::new(),
        }
    }

    /// Register (or replace) the parser for an extension.
    pub fn with_parser(mut self, extension: &str, parser: Arc<dyn DocumentParser>) -> Self {
        self.parsers.insert(extension.to_lowercase(), parser);
        self
    }

    /// Registered extensions, sorted.
    pub fn extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.parsers.keys().map(String::as_str).collect();
        exts.sort_unstable();
        exts
    }

    pub fn supports(&self, extension: &str) -> bool {
        self.parsers.contains_key(&extension.to_lowercase())
    }

    /// Read and parse one file, returning `(filename, text)`.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn parse_file(&self, path: &Path) -> Result<(String, String)> {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(AppError::FileNotFound(path.display().to_string()));
        }

        let parser = self
            .parsers
            .get(&extension)
            .ok_or_else(|| AppError::UnsupportedFileType(extension.clone()))?;

        let bytes = tokio::fs::read(path).await?;
        let text = parser.parse(&bytes)?;
        info!(filename = %filename, chars = text.chars().count(), "Parsed document");

        Ok((filename, text))
    }

    fn reply_error(&self, trace_id: String, error: &AppError) -> Envelope {
        warn!(trace_id = %trace_id, kind = error.kind(), error = %error, "Ingestion failed");
        Envelope::error(components::INGESTION, components::UI, trace_id, error)
    }
}

impl Default for IngestionAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Agent for IngestionAgent {
    fn name(&self) -> &'static str {
        components::INGESTION
    }

    fn accepts(&self) -> &'static [MessageType] {
        &[MessageType::FileUpload]
    }

    async fn handle(&self, message: Envelope) -> Envelope {
        let kind = message.message_type();
        let Envelope {
            trace_id, payload, ..
        } = message;

        let Payload::FileUpload { file_path } = payload else {
            return self.reply_error(trace_id, &unsupported(kind));
        };

        match self.parse_file(&file_path).await {
            Ok((filename, text)) => Envelope::new(
                components::INGESTION,
                components::RETRIEVAL,
                trace_id,
                Payload::ContextDocumentParsed { text, filename },
            ),
            Err(e) => self.reply_error(trace_id, &e),
        }
    }
}
