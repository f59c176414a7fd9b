//! # oracle-rag
//!
//! Retrieval-Augmented Generation core for a conversational research
//! assistant. The crate turns a directory of heterogeneous documents into a
//! persisted vector index and exposes the retrieval surface as agent tools.
//!
//! ## Overview
//!
//! - [`CorpusLoader`] — extracts text from `txt`/`md`/`pdf`/`docx` files,
//!   tagging each document with its source file name
//! - [`FixedSizeChunker`] — deterministic sliding-window splitting with overlap
//! - [`EmbeddingProvider`] — the embedding service boundary
//!   ([`OllamaEmbeddingProvider`] included)
//! - [`VectorIndex`] — in-memory cosine-similarity index, persisted to disk
//!   and reloaded without re-embedding
//! - [`IndexManager`] — builds or loads the index once per process and
//!   implements [`Retriever`] for the tools
//! - [`DocSearchTool`] / [`AnalyzeDocsTool`] — the corpus-facing agent tools,
//!   plus web search, arithmetic, and output persistence glue
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use oracle_rag::{
//!     AnalyzeDocsTool, DocSearchTool, IndexManager, OllamaChatModel,
//!     OllamaEmbeddingProvider, RagConfig,
//! };
//!
//! # async fn run() -> oracle_rag::Result<()> {
//! let config = RagConfig::default();
//! let manager = Arc::new(IndexManager::new(
//!     config.clone(),
//!     "docs",
//!     "rag_index",
//!     Arc::new(OllamaEmbeddingProvider::new("all-minilm")),
//! ));
//!
//! let search = DocSearchTool::new(manager.clone(), &config);
//! let analyze = AnalyzeDocsTool::new(
//!     manager,
//!     Arc::new(OllamaChatModel::new("qwen3:0.6b")),
//!     &config,
//! );
//!
//! let answer = search.query("what are the payment terms?").await?;
//! let summary = analyze.analyze().await?;
//! # Ok(())
//! # }
//! ```
//!
//! The first call builds the index (load → chunk → embed → persist); later
//! calls, and later process runs against the same index directory, reuse it
//! without further embedding work. Deleting the index directory forces a
//! full rebuild on the next call.

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod index;
pub mod llm;
pub mod loader;
pub mod manager;
pub mod retriever;
pub mod tool;
pub mod tools;

pub use chunking::{Chunker, FixedSizeChunker};
pub use config::{LoadErrorPolicy, RagConfig, RagConfigBuilder};
pub use document::{Chunk, Document, SearchResult};
pub use embedding::{EmbeddingProvider, OllamaEmbeddingProvider};
pub use error::{RagError, Result};
pub use index::{INDEX_FILE, VectorIndex};
pub use llm::{LanguageModel, OllamaChatModel};
pub use loader::CorpusLoader;
pub use manager::IndexManager;
pub use retriever::Retriever;
pub use tool::Tool;
pub use tools::{
    AnalyzeDocsTool, DocSearchTool, MathOp, MathTool, NO_RELEVANT_CONTENT, SaveTool,
    WebSearchTool, format_snippets, math_tools,
};
