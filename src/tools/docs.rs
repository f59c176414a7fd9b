//! Document retrieval and corpus analysis tools.
//!
//! Both tools share the same context-assembly rule: each hit is rendered as
//! an attributed snippet, snippets are joined with blank-line separators,
//! and assembly stops at the first snippet that would push the total past
//! the configured character budget. Truncation never happens mid-snippet
//! and the assembled context never exceeds the budget.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{error, info};

use crate::config::RagConfig;
use crate::document::SearchResult;
use crate::error::{RagError, Result};
use crate::llm::LanguageModel;
use crate::retriever::Retriever;
use crate::tool::Tool;

/// Sentinel returned when a query matches nothing in the corpus.
///
/// A fixed, observable string rather than an empty result, so callers and
/// the agent can distinguish "nothing relevant" from a failed call.
pub const NO_RELEVANT_CONTENT: &str = "No relevant content was found in the documents.";

/// The broad probe query the analysis tool retrieves context with.
const ANALYSIS_QUERY: &str = "summary overview main themes";

const SNIPPET_SEPARATOR: &str = "\n\n";

/// Assemble search results into a source-attributed context block of at
/// most `budget` characters.
///
/// Each result renders as `[source]` on its own line followed by the chunk
/// text. Assembly stops before the first snippet that would exceed the
/// budget. Returns [`NO_RELEVANT_CONTENT`] when nothing fits or `results`
/// is empty.
pub fn format_snippets(results: &[SearchResult], budget: usize) -> String {
    let mut out = String::new();
    let mut out_chars = 0;

    for result in results {
        let snippet = format!("[{}]\n{}", result.chunk.source, result.chunk.text);
        let snippet_chars = snippet.chars().count();
        let added = if out.is_empty() {
            snippet_chars
        } else {
            snippet_chars + SNIPPET_SEPARATOR.len()
        };
        if out_chars + added > budget {
            break;
        }
        if !out.is_empty() {
            out.push_str(SNIPPET_SEPARATOR);
        }
        out.push_str(&snippet);
        out_chars += added;
    }

    if out.is_empty() { NO_RELEVANT_CONTENT.to_string() } else { out }
}

/// Searches the corpus index and returns attributed snippets.
///
/// Wraps a [`Retriever`] so the agent can answer questions from the local
/// document corpus without managing the index lifecycle.
pub struct DocSearchTool {
    retriever: Arc<dyn Retriever>,
    top_k: usize,
    context_budget: usize,
}

impl DocSearchTool {
    /// Create a search tool using the config's `search_top_k` and
    /// `search_context_budget`.
    pub fn new(retriever: Arc<dyn Retriever>, config: &RagConfig) -> Self {
        Self {
            retriever,
            top_k: config.search_top_k,
            context_budget: config.search_context_budget,
        }
    }

    /// Search the corpus and assemble attributed snippets for `query`.
    ///
    /// # Errors
    ///
    /// Propagates retrieval failures; an empty result set is not an error
    /// and yields [`NO_RELEVANT_CONTENT`].
    pub async fn query(&self, query: &str) -> Result<String> {
        let results = self.retriever.retrieve(query, self.top_k).await?;
        info!(query, results = results.len(), "document search");
        Ok(format_snippets(&results, self.context_budget))
    }
}

#[async_trait]
impl Tool for DocSearchTool {
    fn name(&self) -> &str {
        "query_documents"
    }

    fn description(&self) -> &str {
        "Find and quote content from the local document corpus (PDFs, text files, Word documents). \
         Ideal for answering questions based on document content."
    }

    fn parameters_schema(&self) -> Option<Value> {
        Some(json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query to find relevant document content"
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

        let answer = self.query(query).await.map_err(|e| {
            error!(error = %e, "query_documents failed");
            e
        })?;
        Ok(Value::String(answer))
    }
}

/// Summarizes the whole corpus snapshot with the language model.
///
/// Takes no meaningful input: it always retrieves a broad sample of the
/// corpus, assembles it under the analysis budget, and delegates
/// generation to the configured [`LanguageModel`], returning the model's
/// output unmodified.
pub struct AnalyzeDocsTool {
    retriever: Arc<dyn Retriever>,
    model: Arc<dyn LanguageModel>,
    top_k: usize,
    context_budget: usize,
}

impl AnalyzeDocsTool {
    /// Create an analysis tool using the config's `analysis_top_k` and
    /// `analysis_context_budget`.
    pub fn new(
        retriever: Arc<dyn Retriever>,
        model: Arc<dyn LanguageModel>,
        config: &RagConfig,
    ) -> Self {
        Self {
            retriever,
            model,
            top_k: config.analysis_top_k,
            context_budget: config.analysis_context_budget,
        }
    }

    /// Analyze the corpus and return the model's summary.
    ///
    /// Returns [`NO_RELEVANT_CONTENT`] without calling the model when the
    /// corpus index is empty.
    ///
    /// # Errors
    ///
    /// Propagates retrieval and language model failures.
    pub async fn analyze(&self) -> Result<String> {
        let results = self.retriever.retrieve(ANALYSIS_QUERY, self.top_k).await?;
        if results.is_empty() {
            return Ok(NO_RELEVANT_CONTENT.to_string());
        }

        let context = format_snippets(&results, self.context_budget);
        let prompt = format!(
            "You are analyzing a local document corpus. Based only on the excerpts below, \
             summarize the main themes and key facts. Cite the bracketed source file names \
             when referring to specific content.\n\n{context}"
        );

        info!(results = results.len(), context_chars = context.chars().count(), "corpus analysis");
        self.model.complete(&prompt).await
    }
}

#[async_trait]
impl Tool for AnalyzeDocsTool {
    fn name(&self) -> &str {
        "analyze_documents"
    }

    fn description(&self) -> &str {
        "Produce an overall summary and analysis of the entire local document corpus. \
         Takes no arguments; always analyzes the whole corpus."
    }

    async fn execute(&self, _args: Value) -> Result<Value> {
        let summary = self.analyze().await.map_err(|e| {
            error!(error = %e, "analyze_documents failed");
            e
        })?;
        Ok(Value::String(summary))
    }
}
