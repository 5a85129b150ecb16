//! Text embedding models.
//!
//! The retrieval engine only depends on the [`Embedder`] trait. Two
//! implementations ship with the crate:
//!
//! - [`HashEmbedder`]: deterministic feature hashing, no model download.
//!   Good enough for keyword-level similarity and for tests.
//! - [`FastEmbedder`]: ONNX sentence embeddings via fastembed
//!   (requires the `local-embeddings` feature).

use crate::types::{AppError, Result};
use crate::utils::toml_config::{EmbeddingConfig, EmbeddingProvider};
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Maps text to fixed-dimensional vectors.
///
/// Implementations must return exactly one vector per input, in input order,
/// all of the same dimension.
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts.
    fn encode(&self, batch: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single text.
    fn encode_one(&self, text: &str) -> Result<Vec<f32>> {
        self.encode(&[text.to_string()])?
            .pop()
            .ok_or_else(|| AppError::Embedding("Embedder returned no vector".to_string()))
    }

    /// Identifier of the underlying model.
    fn model_name(&self) -> &str;
}

/// Check an embedder's output against its input batch.
///
/// # Errors
///
/// Returns [`AppError::Embedding`] if the vector count differs from
/// `expected` or the vectors do not share one dimension.
pub fn check_batch(vectors: &[Vec<f32>], expected: usize) -> Result<()> {
    if vectors.len() != expected {
        return Err(AppError::Embedding(format!(
            "Expected {} embeddings, got {}",
            expected,
            vectors.len()
        )));
    }

    if let Some(first) = vectors.first() {
        let dim = first.len();
        if let Some(bad) = vectors.iter().find(|v| v.len() != dim) {
            return Err(AppError::Embedding(format!(
                "Inconsistent embedding dimensions: {} and {}",
                dim,
                bad.len()
            )));
        }
    }

    Ok(())
}

/// Create the embedder selected by configuration.
pub fn from_config(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>> {
    match config.provider {
        EmbeddingProvider::Hash => Ok(Arc::new(HashEmbedder::new(config.dimensions)?)),
        #[cfg(feature = "local-embeddings")]
        EmbeddingProvider::Fastembed => Ok(Arc::new(FastEmbedder::new(&config.model)?)),
        #[cfg(not(feature = "local-embeddings"))]
        EmbeddingProvider::Fastembed => Err(AppError::Config(format!(
            "Embedding model '{}' requires the 'local-embeddings' feature",
            config.model
        ))),
    }
}

// ============= Feature Hashing =============

/// Deterministic bag-of-words embedder using signed feature hashing.
///
/// Each lowercase alphanumeric token is hashed with SHA-256; the digest picks
/// a bucket and a sign. The accumulated vector is L2-normalized, so texts
/// sharing many tokens end up close under Euclidean distance.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimensions: usize,
    name: String,
}

impl HashEmbedder {
    /// Create a hashing embedder producing `dimensions`-long vectors.
    pub fn new(dimensions: usize) -> Result<Self> {
        if dimensions == 0 {
            return Err(AppError::Config(
                "Embedding dimensions must be greater than 0".to_string(),
            ));
        }
        Ok(Self {
            dimensions,
            name: format!("feature-hash-{}", dimensions),
        })
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let digest = Sha256::digest(token.to_lowercase().as_bytes());
            let mut bucket_bytes = [0u8; 8];
            bucket_bytes.copy_from_slice(&digest[..8]);
            let bucket = (u64::from_le_bytes(bucket_bytes) % self.dimensions as u64) as usize;
            let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }
        vector
    }
}

impl Embedder for HashEmbedder {
    fn encode(&self, batch: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(batch.iter().map(|text| self.embed(text)).collect())
    }

    fn model_name(&self) -> &str {
        &self.name
    }
}

// ============= fastembed =============

#[cfg(feature = "local-embeddings")]
pub use local::FastEmbedder;

#[cfg(feature = "local-embeddings")]
mod local {
    use super::Embedder;
    use crate::types::{AppError, Result};
    use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
    use parking_lot::Mutex;

    /// Sentence embeddings computed locally with fastembed.
    pub struct FastEmbedder {
        model: Mutex<TextEmbedding>,
        name: String,
    }

    impl FastEmbedder {
        /// Load (downloading on first use) the named model.
        pub fn new(model_name: &str) -> Result<Self> {
            let kind = match model_name {
                "sentence-transformers/all-MiniLM-L6-v2" | "all-MiniLM-L6-v2" => {
                    EmbeddingModel::AllMiniLML6V2
                }
                "BAAI/bge-small-en-v1.5" => EmbeddingModel::BGESmallENV15,
                "BAAI/bge-base-en-v1.5" => EmbeddingModel::BGEBaseENV15,
                other => {
                    return Err(AppError::Config(format!(
                        "Unsupported embedding model: {}",
                        other
                    )))
                }
            };

            tracing::info!(model = model_name, "Loading embedding model");
            let model = TextEmbedding::try_new(
                InitOptions::new(kind).with_show_download_progress(false),
            )
            .map_err(|e| AppError::Embedding(e.to_string()))?;

            Ok(Self {
                model: Mutex::new(model),
                name: model_name.to_string(),
            })
        }
    }

    impl Embedder for FastEmbedder {
        fn encode(&self, batch: &[String]) -> Result<Vec<Vec<f32>>> {
            let texts: Vec<&str> = batch.iter().map(String::as_str).collect();
            self.model
                .lock()
                .embed(texts, None)
                .map_err(|e| AppError::Embedding(e.to_string()))
        }

        fn model_name(&self) -> &str {
            &self.name
        }
    }
}
