//! Mock implementations for testing.
//!
//! This module provides mock LLM clients and embedders that can be used
//! across different test files without duplication.

use async_trait::async_trait;
use docqa::rag::Embedder;
use docqa::types::{AppError, Result};
use docqa::LLMClient;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Mock LLM client with a canned response.
///
/// Every prompt it receives is recorded and can be inspected through the
/// handle returned by [`MockLLMClient::prompts`].
#[derive(Clone)]
pub struct MockLLMClient {
    response: String,
    should_fail: bool,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockLLMClient {
    /// Create a new mock client that returns the given response.
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            should_fail: false,
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock client that always returns an error.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::new("")
        }
    }

    /// Shared view of the prompts received so far.
    pub fn prompts(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.prompts)
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().push(prompt.to_string());
        if self.should_fail {
            return Err(AppError::LLM("Mock LLM failure".to_string()));
        }
        Ok(self.response.clone())
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

/// Embedder backed by a fixed text-to-vector table.
///
/// Texts missing from the table map to `fallback` when one is set and fail
/// with an embedding error otherwise.
#[derive(Clone, Default)]
pub struct StubEmbedder {
    table: HashMap<String, Vec<f32>>,
    fallback: Option<Vec<f32>>,
}

impl StubEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `text` to `vector`.
    pub fn with(mut self, text: &str, vector: &[f32]) -> Self {
        self.table.insert(text.to_string(), vector.to_vec());
        self
    }

    pub fn with_fallback(mut self, vector: &[f32]) -> Self {
        self.fallback = Some(vector.to_vec());
        self
    }
}

impl Embedder for StubEmbedder {
    fn encode(&self, batch: &[String]) -> Result<Vec<Vec<f32>>> {
        batch
            .iter()
            .map(|text| {
                self.table
                    .get(text)
                    .or(self.fallback.as_ref())
                    .cloned()
                    .ok_or_else(|| AppError::Embedding(format!("No stub vector for '{}'", text)))
            })
            .collect()
    }

    fn model_name(&self) -> &str {
        "stub"
    }
}

/// Embedder whose calls always fail.
#[derive(Clone, Copy, Default)]
pub struct FailingEmbedder;

impl Embedder for FailingEmbedder {
    fn encode(&self, _batch: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(AppError::Embedding("Mock embedding failure".to_string()))
    }

    fn model_name(&self) -> &str {
        "failing"
    }
}

/// Embedder that returns one vector too few.
#[derive(Clone, Copy, Default)]
pub struct ShortBatchEmbedder;

impl Embedder for ShortBatchEmbedder {
    fn encode(&self, batch: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(batch.iter().skip(1).map(|_| vec![0.0, 1.0]).collect())
    }

    fn model_name(&self) -> &str {
        "short"
    }
}
