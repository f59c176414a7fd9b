//! Document chunking.
//!
//! This module provides the [`Chunker`] trait and [`FixedSizeChunker`],
//! a sliding-window splitter with configurable overlap. Chunk sizes and
//! overlaps are measured in characters, not bytes, so multi-byte text
//! never splits inside a code point.

use crate::document::{Chunk, Document};

/// A strategy for splitting documents into chunks.
///
/// Implementations produce [`Chunk`]s with text and metadata but no
/// embeddings. Embeddings are attached later by the index manager.
/// Chunking must be deterministic: the same document and parameters
/// always yield the same chunk sequence.
pub trait Chunker: Send + Sync {
    /// Split a document into chunks.
    ///
    /// Returns an empty `Vec` if the document has empty text.
    /// Each returned chunk has an empty embedding vector.
    fn chunk(&self, document: &Document) -> Vec<Chunk>;
}

/// Splits text into fixed-size chunks by character count with configurable overlap.
///
/// The window start advances by `chunk_size - chunk_overlap` characters each
/// step, so consecutive chunks of the same document share exactly
/// `chunk_overlap` characters. The window that reaches the end of the text
/// is the final chunk (it may be shorter than `chunk_size`); no trailing
/// window is emitted after it, so no chunk is a subrange of its
/// predecessor. Chunk IDs are generated as `{document_id}_{chunk_index}`.
///
/// Invalid parameters (`chunk_overlap >= chunk_size`) are rejected when the
/// [`RagConfig`](crate::config::RagConfig) is built, before any document is
/// processed.
///
/// # Example
///
/// ```rust,ignore
/// use oracle_rag::FixedSizeChunker;
///
/// let chunker = FixedSizeChunker::new(1000, 200);
/// let chunks = chunker.chunk(&document);
/// ```
#[derive(Debug, Clone)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl FixedSizeChunker {
    /// Create a new `FixedSizeChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` — maximum number of characters per chunk
    /// * `chunk_overlap` — number of overlapping characters between consecutive chunks
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }
}

impl Chunker for FixedSizeChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        if document.text.is_empty() {
            return Vec::new();
        }

        let chars: Vec<char> = document.text.chars().collect();
        let mut chunks = Vec::new();
        let mut start = 0;
        let mut chunk_index = 0;

        while start < chars.len() {
            let end = (start + self.chunk_size).min(chars.len());
            let chunk_text: String = chars[start..end].iter().collect();

            chunks.push(Chunk {
                id: format!("{}_{chunk_index}", document.id),
                text: chunk_text,
                source: document.source.clone(),
                chunk_index,
                embedding: Vec::new(),
                document_id: document.id.clone(),
                metadata: document.metadata.clone(),
            });

            // The window that reached the end covers everything that is
            // left; a further window would only repeat part of it.
            if end == chars.len() {
                break;
            }

            chunk_index += 1;
            let step = self.chunk_size.saturating_sub(self.chunk_overlap);
            if step == 0 {
                break;
            }
            start += step;
        }

        chunks
    }
}
