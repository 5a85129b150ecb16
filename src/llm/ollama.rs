use crate::llm::client::LLMClient;
use crate::types::{AppError, Result};
use async_trait::async_trait;
use ollama_rs::{
    generation::chat::{request::ChatMessageRequest, ChatMessage},
    models::ModelOptions,
    Ollama,
};

const DEFAULT_PORT: u16 = 11434;

pub struct OllamaClient {
    client: Ollama,
    model: String,
    temperature: Option<f32>,
}

impl OllamaClient {
    pub async fn new(base_url: String, model: String) -> Result<Self> {
        let (host, port) = split_base_url(&base_url)?;
        tracing::debug!(host = %host, port, model = %model, "Creating Ollama client");

        let client = Ollama::new(host, port);

        Ok(Self {
            client,
            model,
            temperature: None,
        })
    }

    /// Sampling temperature sent with every request; `None` keeps the model default.
    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }
}

#[async_trait]
impl LLMClient for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let messages = vec![ChatMessage::user(prompt.to_string())];
        let mut request = ChatMessageRequest::new(self.model.clone(), messages);
        if let Some(temperature) = self.temperature {
            request = request.options(ModelOptions::default().temperature(temperature));
        }

        let response = self
            .client
            .send_chat_messages(request)
            .await
            .map_err(|e| AppError::LLM(format!("Ollama error: {}", e)))?;

        Ok(response.message.content)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Split `scheme://host[:port][/path]` into `("scheme://host", port)`.
///
/// The scheme defaults to `http` and the port to 11434.
fn split_base_url(base_url: &str) -> Result<(String, u16)> {
    let trimmed = base_url.trim();
    let (scheme, rest) = match trimmed.split_once("://") {
        Some((scheme, rest)) => (scheme, rest),
        None => ("http", trimmed),
    };
    if scheme != "http" && scheme != "https" {
        return Err(AppError::Config(format!(
            "Unsupported Ollama URL scheme '{}' in '{}'",
            scheme, base_url
        )));
    }

    let authority = rest.split('/').next().unwrap_or_default();
    let (host, port) = match authority.rsplit_once(':') {
        Some((host, port)) => {
            let port = port.parse::<u16>().map_err(|_| {
                AppError::Config(format!("Invalid port '{}' in Ollama URL '{}'", port, base_url))
            })?;
            (host, port)
        }
        None => (authority, DEFAULT_PORT),
    };
    if host.is_empty() {
        return Err(AppError::Config(format!(
            "Missing host in Ollama URL '{}'",
            base_url
        )));
    }

    Ok((format!("{}://{}", scheme, host), port))
}
