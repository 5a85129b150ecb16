//! TOML-based configuration for docqa
//!
//! All tunables (chunking, embedding model, LLM endpoint, logging) live in a
//! single `docqa.toml`. Every section and field is optional; missing values
//! fall back to the defaults below.
//!
//! ```toml
//! [logging]
//! level = "info"
//! format = "pretty"
//!
//! [rag]
//! chunk_size = 500
//! chunk_overlap = 100
//! default_top_k = 8
//!
//! [embedding]
//! provider = "hash"
//! dimensions = 384
//!
//! [llm]
//! provider = "ollama"
//! base_url = "http://localhost:11434"
//! model = "llama3.2"
//! temperature = 0.3
//! ```

use crate::agents::retrieval::RetrievalConfig;
use crate::llm::Provider;
use crate::types::AppError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "docqa.toml";

/// Root configuration structure loaded from docqa.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocqaConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub rag: RagConfig,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub llm: LlmConfig,
}

// ============= Logging Configuration =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

// ============= RAG Configuration =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    #[serde(default = "default_top_k")]
    pub default_top_k: usize,
}

fn default_chunk_size() -> usize {
    500
}

fn default_chunk_overlap() -> usize {
    100
}

fn default_top_k() -> usize {
    8
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            default_top_k: default_top_k(),
        }
    }
}

// ============= Embedding Configuration =============

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// Built-in feature hashing, no model files needed
    #[default]
    Hash,
    /// fastembed ONNX models (requires the `local-embeddings` feature)
    Fastembed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default)]
    pub provider: EmbeddingProvider,

    /// Model name, used by the `fastembed` provider
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Vector length, used by the `hash` provider
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,
}

fn default_embedding_model() -> String {
    "sentence-transformers/all-MiniLM-L6-v2".to_string()
}

fn default_dimensions() -> usize {
    384
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::default(),
            model: default_embedding_model(),
            dimensions: default_dimensions(),
        }
    }
}

// ============= LLM Configuration =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum LlmConfig {
    Ollama {
        #[serde(default = "default_ollama_url")]
        base_url: String,
        #[serde(default = "default_llm_model")]
        model: String,
        #[serde(default = "default_temperature")]
        temperature: f32,
    },
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_llm_model() -> String {
    "llama3.2".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

impl Default for LlmConfig {
    fn default() -> Self {
        LlmConfig::Ollama {
            base_url: default_ollama_url(),
            model: default_llm_model(),
            temperature: default_temperature(),
        }
    }
}

impl LlmConfig {
    /// Runtime provider selection for this configuration.
    pub fn provider(&self) -> Provider {
        match self {
            LlmConfig::Ollama {
                base_url,
                model,
                temperature,
            } => Provider::Ollama {
                base_url: base_url.clone(),
                model: model.clone(),
                temperature: Some(*temperature),
            },
        }
    }
}

// ============= Configuration Loading & Validation =============

/// Configuration warnings that don't prevent operation but may indicate issues
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub kind: ConfigWarningKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigWarningKind {
    /// Overlap is more than half the chunk size, so most text is embedded twice.
    HighOverlap,
    /// A setting that the selected provider ignores.
    IgnoredSetting,
    /// The selected provider is not compiled into this binary.
    FeatureDisabled,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize TOML: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

impl DocqaConfig {
    /// Load and validate configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config = Self::parse(&content)?;
        debug!(path = %path.display(), "Loaded configuration");

        Ok(config)
    }

    /// Load the file if it exists, otherwise use defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::FileNotFound(path)) => {
                debug!(path = %path.display(), "No configuration file, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Parse and validate configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: DocqaConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate the configuration for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        let level = self.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging.level '{}' must be one of: {}",
                self.logging.level,
                LOG_LEVELS.join(", ")
            )));
        }

        if self.rag.chunk_size == 0 {
            return Err(ConfigError::ValidationError(
                "rag.chunk_size must be greater than 0".to_string(),
            ));
        }
        if self.rag.chunk_overlap >= self.rag.chunk_size {
            return Err(ConfigError::ValidationError(format!(
                "rag.chunk_overlap ({}) must be smaller than rag.chunk_size ({})",
                self.rag.chunk_overlap, self.rag.chunk_size
            )));
        }
        if self.rag.default_top_k == 0 {
            return Err(ConfigError::ValidationError(
                "rag.default_top_k must be at least 1".to_string(),
            ));
        }

        match self.embedding.provider {
            EmbeddingProvider::Hash if self.embedding.dimensions == 0 => {
                return Err(ConfigError::ValidationError(
                    "embedding.dimensions must be greater than 0".to_string(),
                ));
            }
            EmbeddingProvider::Fastembed if self.embedding.model.trim().is_empty() => {
                return Err(ConfigError::ValidationError(
                    "embedding.model must not be empty".to_string(),
                ));
            }
            _ => {}
        }

        match &self.llm {
            LlmConfig::Ollama {
                base_url,
                model,
                temperature,
            } => {
                if base_url.trim().is_empty() {
                    return Err(ConfigError::ValidationError(
                        "llm.base_url must not be empty".to_string(),
                    ));
                }
                if model.trim().is_empty() {
                    return Err(ConfigError::ValidationError(
                        "llm.model must not be empty".to_string(),
                    ));
                }
                if !(0.0..=2.0).contains(temperature) {
                    return Err(ConfigError::ValidationError(format!(
                        "llm.temperature ({}) must be between 0.0 and 2.0",
                        temperature
                    )));
                }
            }
        }

        Ok(())
    }

    /// Validate configuration and collect warnings for questionable settings
    ///
    /// Returns Ok with warnings, or Err if validation fails
    pub fn validate_with_warnings(&self) -> Result<Vec<ConfigWarning>, ConfigError> {
        self.validate()?;

        let mut warnings = Vec::new();

        if self.rag.chunk_overlap * 2 > self.rag.chunk_size {
            warnings.push(ConfigWarning {
                kind: ConfigWarningKind::HighOverlap,
                message: format!(
                    "rag.chunk_overlap ({}) is more than half of rag.chunk_size ({})",
                    self.rag.chunk_overlap, self.rag.chunk_size
                ),
            });
        }

        match self.embedding.provider {
            EmbeddingProvider::Hash if self.embedding.model != default_embedding_model() => {
                warnings.push(ConfigWarning {
                    kind: ConfigWarningKind::IgnoredSetting,
                    message: format!(
                        "embedding.model '{}' is ignored by the hash provider",
                        self.embedding.model
                    ),
                });
            }
            EmbeddingProvider::Fastembed if !cfg!(feature = "local-embeddings") => {
                warnings.push(ConfigWarning {
                    kind: ConfigWarningKind::FeatureDisabled,
                    message: "embedding.provider 'fastembed' requires the 'local-embeddings' feature"
                        .to_string(),
                });
            }
            _ => {}
        }

        if matches!(self.llm, LlmConfig::Ollama { .. }) && !cfg!(feature = "ollama") {
            warnings.push(ConfigWarning {
                kind: ConfigWarningKind::FeatureDisabled,
                message: "llm.provider 'ollama' requires the 'ollama' feature".to_string(),
            });
        }

        Ok(warnings)
    }

    /// Retrieval engine parameters
    pub fn retrieval(&self) -> RetrievalConfig {
        RetrievalConfig {
            chunk_size: self.rag.chunk_size,
            chunk_overlap: self.rag.chunk_overlap,
            default_top_k: self.rag.default_top_k,
        }
    }
}
