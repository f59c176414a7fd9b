//! Index lifecycle orchestration.
//!
//! [`IndexManager`] is the explicit handle that owns the build-or-load
//! decision for the corpus index. It is constructed once at process start
//! and shared by reference with every component that needs retrieval; the
//! underlying [`VectorIndex`] is memoized for the process lifetime, so
//! embedding work happens at most once per index directory.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::chunking::{Chunker, FixedSizeChunker};
use crate::config::RagConfig;
use crate::document::SearchResult;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::index::VectorIndex;
use crate::loader::CorpusLoader;
use crate::retriever::Retriever;

/// Builds or loads the corpus index and serves similarity queries.
///
/// # Example
///
/// ```rust,ignore
/// use oracle_rag::{IndexManager, OllamaEmbeddingProvider, RagConfig};
///
/// let manager = IndexManager::new(
///     RagConfig::default(),
///     "docs",
///     "rag_index",
///     Arc::new(OllamaEmbeddingProvider::new("all-minilm")),
/// );
/// let index = manager.get_index().await?;
/// ```
pub struct IndexManager {
    config: RagConfig,
    corpus_dir: PathBuf,
    index_dir: PathBuf,
    embedder: Arc<dyn EmbeddingProvider>,
    /// Memoized index. The mutex also serializes concurrent build attempts:
    /// a second caller blocks until the first build completes, then
    /// receives the memoized result.
    index: Mutex<Option<Arc<VectorIndex>>>,
}

impl IndexManager {
    /// Create a manager for the given corpus and index directories.
    pub fn new(
        config: RagConfig,
        corpus_dir: impl Into<PathBuf>,
        index_dir: impl Into<PathBuf>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        Self {
            config,
            corpus_dir: corpus_dir.into(),
            index_dir: index_dir.into(),
            embedder,
            index: Mutex::new(None),
        }
    }

    /// Return the corpus index, building or loading it on first call.
    ///
    /// If the index directory holds a valid persisted index produced by the
    /// active embedding model, it is loaded without re-embedding. A corrupt
    /// persisted index, or one produced by a different embedding model,
    /// triggers a full rebuild with a warning. Subsequent calls within the
    /// process return the memoized index and perform no embedding work;
    /// invalidation requires a process restart or deleting the index
    /// directory beforehand.
    ///
    /// # Errors
    ///
    /// Propagates [`RagError::Embedding`] from the embedding service,
    /// [`RagError::DimensionMismatch`] for inconsistent vectors, and I/O
    /// errors from reading the corpus or writing the index.
    pub async fn get_index(&self) -> Result<Arc<VectorIndex>> {
        let mut memo = self.index.lock().await;
        if let Some(index) = &*memo {
            return Ok(index.clone());
        }

        let index = Arc::new(self.build_or_load().await?);
        *memo = Some(index.clone());
        Ok(index)
    }

    async fn build_or_load(&self) -> Result<VectorIndex> {
        if VectorIndex::exists(&self.index_dir) {
            match VectorIndex::load(&self.index_dir).await {
                Ok(index) if index.model() == self.embedder.model_name() => {
                    return Ok(index);
                }
                Ok(index) => {
                    warn!(
                        persisted_model = %index.model(),
                        active_model = %self.embedder.model_name(),
                        "persisted index was built with a different embedding model; rebuilding"
                    );
                }
                Err(RagError::IndexCorrupt(message)) => {
                    warn!(%message, "persisted index is corrupt; rebuilding from corpus");
                }
                Err(e) => return Err(e),
            }
        } else {
            info!(index_dir = %self.index_dir.display(), "no persisted index found; building from corpus");
        }

        self.build().await
    }

    /// Run the full Loader → Chunker → Embedder → build → save pipeline.
    async fn build(&self) -> Result<VectorIndex> {
        let loader = CorpusLoader::new(self.config.on_load_error);
        let documents = loader.load_dir(&self.corpus_dir).await?;

        let chunker = FixedSizeChunker::new(self.config.chunk_size, self.config.chunk_overlap);
        let mut chunks = Vec::new();
        for document in &documents {
            chunks.extend(chunker.chunk(document));
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let vectors = self.embedder.embed_batch(&texts).await?;

        let index = VectorIndex::build(chunks, vectors, self.embedder.model_name())?;
        index.save(&self.index_dir).await?;

        info!(
            documents = documents.len(),
            chunks = index.len(),
            model = %self.embedder.model_name(),
            "built corpus index"
        );

        Ok(index)
    }
}

#[async_trait]
impl Retriever for IndexManager {
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<SearchResult>> {
        let index = self.get_index().await?;
        let query_embedding = self.embedder.embed(query).await?;

        let mut results = index.search(&query_embedding, top_k);
        if let Some(threshold) = self.config.similarity_threshold {
            results.retain(|r| r.score >= threshold);
        }

        Ok(results)
    }
}
