//! Language model boundary consumed by the corpus analysis tool.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::{RagError, Result};

/// A synchronous, single-shot text completion service.
///
/// Text prompt in, text completion out; no streaming. The analysis tool is
/// the only in-crate consumer.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate a completion for the given prompt.
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// The default Ollama API base URL.
const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// A [`LanguageModel`] backed by the Ollama `/api/chat` endpoint.
pub struct OllamaChatModel {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaChatModel {
    /// Create a new model client for the given model name, using the
    /// default local Ollama endpoint.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_OLLAMA_URL.to_string(),
            model: model.into(),
        }
    }

    /// Override the Ollama base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[async_trait]
impl LanguageModel for OllamaChatModel {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage { role: "user", content: prompt }],
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "Ollama", error = %e, "chat request failed");
                RagError::Model {
                    provider: "Ollama".into(),
                    message: format!("request failed: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(provider = "Ollama", %status, "chat API error");
            return Err(RagError::Model {
                provider: "Ollama".into(),
                message: format!("API returned {status}: {body}"),
            });
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            RagError::Model {
                provider: "Ollama".into(),
                message: format!("failed to parse response: {e}"),
            }
        })?;

        Ok(chat_response.message.content)
    }
}
