//! Retrieval capability consumed by the agent-facing tools.

use async_trait::async_trait;

use crate::document::SearchResult;
use crate::error::Result;

/// A capability for text-query similarity search over the corpus index.
///
/// Tools depend on this trait rather than on index construction, so they
/// never manage the index lifecycle themselves. The production
/// implementation is [`IndexManager`](crate::manager::IndexManager), which
/// embeds the query and searches the memoized [`VectorIndex`](crate::index::VectorIndex).
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Return up to `top_k` chunks most similar to `query`, ordered by
    /// descending similarity.
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<SearchResult>>;
}
