//! Embedding provider boundary for generating vector embeddings from text.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::{RagError, Result};

/// A provider that generates vector embeddings from text input.
///
/// Implementations wrap specific embedding backends behind a unified async
/// interface. The default [`embed_batch`](EmbeddingProvider::embed_batch)
/// implementation calls [`embed`](EmbeddingProvider::embed) sequentially;
/// backends that support native batching should override it.
///
/// The index never assumes a dimensionality declared by the provider: it
/// reads the dimension from the first vector produced and validates that
/// all subsequent vectors match.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of text inputs.
    ///
    /// Returns one vector per input, preserving order. The default
    /// implementation calls [`embed`](EmbeddingProvider::embed)
    /// sequentially for each input.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// The identity of the embedding model, recorded in the persisted
    /// index so a mismatched reload can be detected.
    fn model_name(&self) -> &str;
}

/// The default Ollama API base URL.
const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// An [`EmbeddingProvider`] backed by the Ollama `/api/embed` endpoint.
///
/// # Example
///
/// ```rust,ignore
/// use oracle_rag::OllamaEmbeddingProvider;
///
/// let provider = OllamaEmbeddingProvider::new("all-minilm");
/// let embedding = provider.embed("hello world").await?;
/// ```
pub struct OllamaEmbeddingProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaEmbeddingProvider {
    /// Create a new provider for the given model, using the default
    /// local Ollama endpoint.
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

// ── Ollama API request/response types ──────────────────────────────

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let results = self.embed_batch(&[text]).await?;
        results.into_iter().next().ok_or_else(|| RagError::Embedding {
            provider: "Ollama".into(),
            message: "API returned empty response".into(),
        })
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(provider = "Ollama", batch_size = texts.len(), model = %self.model, "embedding batch");

        let request_body = EmbedRequest { model: &self.model, input: texts.to_vec() };

        let response = self
            .client
            .post(format!("{}/api/embed", self.base_url))
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "Ollama", error = %e, "request failed");
                RagError::Embedding {
                    provider: "Ollama".into(),
                    message: format!("request failed: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(provider = "Ollama", %status, "API error");
            return Err(RagError::Embedding {
                provider: "Ollama".into(),
                message: format!("API returned {status}: {body}"),
            });
        }

        let embed_response: EmbedResponse = response.json().await.map_err(|e| {
            error!(provider = "Ollama", error = %e, "failed to parse response");
            RagError::Embedding {
                provider: "Ollama".into(),
                message: format!("failed to parse response: {e}"),
            }
        })?;

        if embed_response.embeddings.len() != texts.len() {
            return Err(RagError::Embedding {
                provider: "Ollama".into(),
                message: format!(
                    "expected {} embeddings, got {}",
                    texts.len(),
                    embed_response.embeddings.len()
                ),
            });
        }

        Ok(embed_response.embeddings)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
