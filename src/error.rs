//! Error types for the `oracle-rag` crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in RAG operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// A document file could not be read or parsed.
    ///
    /// Recoverable: under the default load-error policy the file is
    /// skipped and indexing continues with the remaining corpus.
    #[error("Failed to load document '{file}': {message}")]
    Load {
        /// The file that failed to load.
        file: PathBuf,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error.
    ///
    /// Fatal: surfaced before any documents are processed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Embedding vectors with inconsistent dimensionality were supplied
    /// to the index. Indicates embedding-service misbehavior.
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimensionality established by the first vector.
        expected: usize,
        /// Dimensionality of the offending vector.
        actual: usize,
    },

    /// The persisted index is missing or malformed.
    ///
    /// Recoverable: the index manager falls back to a full rebuild.
    #[error("Persisted index is unreadable: {0}")]
    IndexCorrupt(String),

    /// An error occurred at the embedding service boundary.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred at the language model boundary.
    #[error("Language model error ({provider}): {message}")]
    Model {
        /// The model provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred inside the vector index.
    #[error("Index error: {0}")]
    Index(String),

    /// A tool was invoked with invalid arguments or failed during execution.
    #[error("Tool error: {0}")]
    Tool(String),

    /// A web search request failed.
    #[error("Search error: {0}")]
    Search(String),

    /// An I/O error outside the load/persist paths above.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
