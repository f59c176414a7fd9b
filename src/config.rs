//! Configuration for the RAG pipeline and tools.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Policy applied when a corpus file cannot be loaded.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum LoadErrorPolicy {
    /// Log the failure and continue with the remaining files.
    ///
    /// This is the default: it maximizes index completeness over a
    /// heterogeneous, possibly-corrupt corpus.
    #[default]
    SkipAndContinue,
    /// Abort the build on the first file that fails to load.
    Abort,
}

/// Configuration parameters for indexing and retrieval.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Number of overlapping characters between consecutive chunks.
    pub chunk_overlap: usize,
    /// Number of results retrieved by the document search tool.
    pub search_top_k: usize,
    /// Number of results retrieved by the corpus analysis tool.
    pub analysis_top_k: usize,
    /// Maximum total length, in characters, of the search tool's
    /// assembled context.
    pub search_context_budget: usize,
    /// Maximum total length, in characters, of the analysis tool's
    /// assembled context.
    pub analysis_context_budget: usize,
    /// Minimum similarity score for results; hits below it are filtered
    /// out. `None` (the default) keeps every hit, including negative-cosine
    /// ones, so an under-filled index still returns all its entries.
    pub similarity_threshold: Option<f32>,
    /// Policy applied when a corpus file fails to load.
    pub on_load_error: LoadErrorPolicy,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            search_top_k: 5,
            analysis_top_k: 10,
            search_context_budget: 3000,
            analysis_context_budget: 3500,
            similarity_threshold: None,
            on_load_error: LoadErrorPolicy::SkipAndContinue,
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the maximum chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the number of results retrieved by the document search tool.
    pub fn search_top_k(mut self, k: usize) -> Self {
        self.config.search_top_k = k;
        self
    }

    /// Set the number of results retrieved by the corpus analysis tool.
    pub fn analysis_top_k(mut self, k: usize) -> Self {
        self.config.analysis_top_k = k;
        self
    }

    /// Set the character budget for the search tool's assembled context.
    pub fn search_context_budget(mut self, budget: usize) -> Self {
        self.config.search_context_budget = budget;
        self
    }

    /// Set the character budget for the analysis tool's assembled context.
    pub fn analysis_context_budget(mut self, budget: usize) -> Self {
        self.config.analysis_context_budget = budget;
        self
    }

    /// Set a minimum similarity score below which results are dropped.
    pub fn similarity_threshold(mut self, threshold: f32) -> Self {
        self.config.similarity_threshold = Some(threshold);
        self
    }

    /// Set the policy applied when a corpus file fails to load.
    pub fn on_load_error(mut self, policy: LoadErrorPolicy) -> Self {
        self.config.on_load_error = policy;
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if:
    /// - `chunk_size == 0`
    /// - `chunk_overlap >= chunk_size` (the chunker window would never advance)
    /// - `search_top_k == 0` or `analysis_top_k == 0`
    /// - either context budget is zero
    pub fn build(self) -> Result<RagConfig> {
        if self.config.chunk_size == 0 {
            return Err(RagError::Config("chunk_size must be greater than zero".to_string()));
        }
        if self.config.chunk_overlap >= self.config.chunk_size {
            return Err(RagError::Config(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.config.chunk_overlap, self.config.chunk_size
            )));
        }
        if self.config.search_top_k == 0 || self.config.analysis_top_k == 0 {
            return Err(RagError::Config("top_k must be greater than zero".to_string()));
        }
        if self.config.search_context_budget == 0 || self.config.analysis_context_budget == 0 {
            return Err(RagError::Config(
                "context budgets must be greater than zero".to_string(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = RagConfig::builder().build().unwrap();
        assert_eq!(config, RagConfig::default());
    }

    #[test]
    fn rejects_overlap_equal_to_chunk_size() {
        let err = RagConfig::builder().chunk_size(100).chunk_overlap(100).build().unwrap_err();
        assert!(matches!(err, RagError::Config(_)));
    }

    #[test]
    fn rejects_overlap_greater_than_chunk_size() {
        let err = RagConfig::builder().chunk_size(100).chunk_overlap(150).build().unwrap_err();
        assert!(matches!(err, RagError::Config(_)));
    }

    #[test]
    fn rejects_zero_chunk_size() {
        let err = RagConfig::builder().chunk_size(0).chunk_overlap(0).build().unwrap_err();
        assert!(matches!(err, RagError::Config(_)));
    }

    #[test]
    fn rejects_zero_top_k() {
        let err = RagConfig::builder().search_top_k(0).build().unwrap_err();
        assert!(matches!(err, RagError::Config(_)));
    }
}
