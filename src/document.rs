//! Data types for documents, chunks, and search results.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A source document containing text content and metadata.
///
/// Documents are produced by the [`CorpusLoader`](crate::loader::CorpusLoader)
/// at index-build time and are not persisted independently; only their
/// chunks survive into the index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique identifier for the document (the originating file name).
    pub id: String,
    /// The text content of the document.
    pub text: String,
    /// The originating file name, propagated to every chunk.
    pub source: String,
    /// Key-value metadata associated with the document.
    pub metadata: HashMap<String, String>,
}

impl Document {
    /// Create a document from raw text, using the file name as both
    /// identifier and source attribution.
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        let source = source.into();
        Self { id: source.clone(), text: text.into(), source, metadata: HashMap::new() }
    }
}

/// A segment of a [`Document`] with its vector embedding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Unique identifier for the chunk, `{document_id}_{chunk_index}`.
    pub id: String,
    /// The text content of the chunk.
    pub text: String,
    /// The originating file name, inherited from the parent document.
    pub source: String,
    /// Position of this chunk within its document's split sequence.
    pub chunk_index: usize,
    /// The vector embedding for this chunk's text. Empty until the
    /// embedding provider has run.
    pub embedding: Vec<f32>,
    /// The ID of the parent [`Document`].
    pub document_id: String,
    /// Key-value metadata inherited from the parent document.
    pub metadata: HashMap<String, String>,
}

/// A retrieved [`Chunk`] paired with a relevance score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// The similarity score (higher is more relevant).
    pub score: f32,
}
