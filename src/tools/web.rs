//! Web search tool over the DuckDuckGo instant-answer API.

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::info;

use crate::error::{RagError, Result};
use crate::tool::Tool;

const DUCKDUCKGO_URL: &str = "https://api.duckduckgo.com";

/// How many related topics to include in the formatted output.
const MAX_TOPICS: usize = 5;

/// Searches the web for up-to-date information the corpus cannot answer.
pub struct WebSearchTool {
    client: reqwest::Client,
    base_url: String,
}

impl Default for WebSearchTool {
    fn default() -> Self {
        Self::new()
    }
}

impl WebSearchTool {
    /// Create a new web search tool.
    pub fn new() -> Self {
        Self { client: reqwest::Client::new(), base_url: DUCKDUCKGO_URL.to_string() }
    }

    /// Override the API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Run a search and format the answer as an attributed text block.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Search`] if the request fails or the response
    /// is not parseable.
    pub async fn search(&self, query: &str) -> Result<String> {
        let url = format!(
            "{}/?q={}&format=json&no_redirect=1&no_html=1",
            self.base_url,
            urlencoding::encode(query)
        );

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| RagError::Search(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(RagError::Search(format!(
                "search API returned {}",
                response.status()
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| RagError::Search(format!("failed to parse response: {e}")))?;

        let formatted = format_results(&payload);
        info!(query, chars = formatted.len(), "web search");
        Ok(formatted)
    }
}

fn format_results(payload: &Value) -> String {
    let mut lines = Vec::new();

    let abstract_text = payload.get("AbstractText").and_then(|v| v.as_str()).unwrap_or("");
    if !abstract_text.is_empty() {
        let abstract_url = payload.get("AbstractURL").and_then(|v| v.as_str()).unwrap_or("");
        if abstract_url.is_empty() {
            lines.push(abstract_text.to_string());
        } else {
            lines.push(format!("{abstract_text} ({abstract_url})"));
        }
    }

    let topics = payload
        .get("RelatedTopics")
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default();
    for topic in topics.iter().take(MAX_TOPICS) {
        let text = topic.get("Text").and_then(|v| v.as_str()).unwrap_or("");
        if text.is_empty() {
            continue;
        }
        match topic.get("FirstURL").and_then(|v| v.as_str()) {
            Some(url) if !url.is_empty() => lines.push(format!("- {text} ({url})")),
            _ => lines.push(format!("- {text}")),
        }
    }

    if lines.is_empty() { "No web results found.".to_string() } else { lines.join("\n") }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "search_web_information"
    }

    fn description(&self) -> &str {
        "Search the internet for up-to-date facts, news, and external references \
         that are not in the local document corpus. Use only when the user's \
         question requires information from the web."
    }

    fn parameters_schema(&self) -> Option<Value> {
        Some(json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The web search query"
                }
            },
            "required": ["query"]
        }))
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let query = args
            .get("query")
            .and_then(|v| v.as_str())
            .ok_or_else(|| RagError::Tool("missing required 'query' parameter".into()))?;
        Ok(Value::String(self.search(query).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_abstract_and_topics() {
        let payload = json!({
            "AbstractText": "Rust is a systems programming language.",
            "AbstractURL": "https://example.org/rust",
            "RelatedTopics": [
                { "Text": "Rust (video game)", "FirstURL": "https://example.org/game" },
                { "Text": "" }
            ]
        });
        let out = format_results(&payload);
        assert!(out.contains("systems programming language"));
        assert!(out.contains("https://example.org/rust"));
        assert!(out.contains("- Rust (video game) (https://example.org/game)"));
    }

    #[test]
    fn empty_payload_yields_no_results_message() {
        assert_eq!(format_results(&json!({})), "No web results found.");
    }
}
