//! LLM Provider Clients
//!
//! The answer generator talks to a model through the [`LLMClient`] trait.
//! Providers are selected at runtime with [`Provider`] and compiled in via
//! Cargo features:
//!
//! - `ollama` (default) - Local Ollama server
//!
//! # Example
//!
//! ```ignore
//! use docqa::llm::Provider;
//!
//! let provider = Provider::Ollama {
//!     base_url: "http://localhost:11434".to_string(),
//!     model: "llama3.2".to_string(),
//!     temperature: Some(0.3),
//! };
//! let client = provider.create_client().await?;
//! let answer = client.generate("What is 2+2?").await?;
//! ```

/// Core LLM client trait and provider selection.
pub mod client;

#[cfg(feature = "ollama")]
pub mod ollama;

pub use client::{LLMClient, Provider};
