//! Persisted vector index with cosine-similarity search.
//!
//! [`VectorIndex`] holds every corpus chunk together with its embedding.
//! It is built once from a corpus snapshot, serialized to a directory as a
//! self-describing JSON file, and reloaded verbatim on later startups so
//! the (expensive) embedding work is never repeated. There is no
//! incremental update path: adding documents means deleting the index
//! directory and rebuilding from the full corpus.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::document::{Chunk, SearchResult};
use crate::error::{RagError, Result};

/// Name of the index's primary file. Its presence in the index directory
/// is the build-vs-load decision gate.
pub const INDEX_FILE: &str = "index.json";

/// Version of the on-disk index format.
const FORMAT_VERSION: u32 = 1;

/// On-disk representation of the index.
#[derive(Serialize, Deserialize)]
struct PersistedIndex {
    version: u32,
    /// The embedding model that produced the vectors, so a reload with a
    /// different model can be detected instead of silently serving
    /// incompatible vectors.
    model: String,
    dimensions: usize,
    entries: Vec<Chunk>,
}

/// An in-memory vector index over corpus chunks.
///
/// Immutable after construction; concurrent reads are safe behind an `Arc`.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    entries: Vec<Chunk>,
    dimensions: usize,
    model: String,
}

impl VectorIndex {
    /// Construct an index from parallel sequences of chunks and vectors.
    ///
    /// The dimensionality is read from the first vector; every subsequent
    /// vector must match it.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Index`] if the sequences differ in length and
    /// [`RagError::DimensionMismatch`] if any vector's dimensionality
    /// differs from the first's.
    pub fn build(
        mut chunks: Vec<Chunk>,
        vectors: Vec<Vec<f32>>,
        model: impl Into<String>,
    ) -> Result<Self> {
        if chunks.len() != vectors.len() {
            return Err(RagError::Index(format!(
                "got {} chunks but {} vectors",
                chunks.len(),
                vectors.len()
            )));
        }

        let dimensions = vectors.first().map(Vec::len).unwrap_or(0);
        for vector in &vectors {
            if vector.len() != dimensions {
                return Err(RagError::DimensionMismatch {
                    expected: dimensions,
                    actual: vector.len(),
                });
            }
        }

        for (chunk, vector) in chunks.iter_mut().zip(vectors) {
            chunk.embedding = vector;
        }

        Ok(Self { entries: chunks, dimensions, model: model.into() })
    }

    /// Whether a persisted index exists in `dir`.
    pub fn exists(dir: &Path) -> bool {
        dir.join(INDEX_FILE).is_file()
    }

    /// Serialize the index to `dir` as a self-describing JSON file.
    ///
    /// The file is written to a temporary sibling and renamed into place,
    /// so a crash mid-write leaves either the previous index or the new
    /// one on disk, never a half-written file.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Io`] if the directory cannot be created or the
    /// file cannot be written, and [`RagError::Index`] if serialization fails.
    pub async fn save(&self, dir: &Path) -> Result<()> {
        tokio::fs::create_dir_all(dir).await?;

        let persisted = PersistedIndex {
            version: FORMAT_VERSION,
            model: self.model.clone(),
            dimensions: self.dimensions,
            entries: self.entries.clone(),
        };
        let data = serde_json::to_string(&persisted)
            .map_err(|e| RagError::Index(format!("failed to serialize index: {e}")))?;

        let final_path = dir.join(INDEX_FILE);
        let temp_path = dir.join(format!("{INDEX_FILE}.tmp"));
        tokio::fs::write(&temp_path, data).await?;
        tokio::fs::rename(&temp_path, &final_path).await?;

        info!(path = %final_path.display(), entries = self.entries.len(), "saved index");
        Ok(())
    }

    /// Deserialize an index previously written by [`save`](VectorIndex::save).
    ///
    /// # Errors
    ///
    /// Returns [`RagError::IndexCorrupt`] if the index file is missing,
    /// unparseable, carries an unknown format version, or contains entries
    /// whose embeddings do not match the recorded dimensionality.
    pub async fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(INDEX_FILE);
        let data = tokio::fs::read_to_string(&path).await.map_err(|e| {
            RagError::IndexCorrupt(format!("cannot read '{}': {e}", path.display()))
        })?;

        let persisted: PersistedIndex = serde_json::from_str(&data).map_err(|e| {
            RagError::IndexCorrupt(format!("cannot parse '{}': {e}", path.display()))
        })?;

        if persisted.version != FORMAT_VERSION {
            return Err(RagError::IndexCorrupt(format!(
                "unsupported index format version {}",
                persisted.version
            )));
        }
        for entry in &persisted.entries {
            if entry.embedding.len() != persisted.dimensions {
                return Err(RagError::IndexCorrupt(format!(
                    "entry '{}' has dimension {} but index records {}",
                    entry.id,
                    entry.embedding.len(),
                    persisted.dimensions
                )));
            }
        }

        info!(path = %path.display(), entries = persisted.entries.len(), model = %persisted.model, "loaded index");

        Ok(Self {
            entries: persisted.entries,
            dimensions: persisted.dimensions,
            model: persisted.model,
        })
    }

    /// Return up to `top_k` entries most similar to the query embedding,
    /// ordered by descending cosine similarity.
    ///
    /// Fewer than `top_k` results are returned when the index holds fewer
    /// entries; an empty index yields an empty result, never an error.
    /// Ties keep corpus insertion order, so results are deterministic for
    /// a fixed index and query.
    pub fn search(&self, query: &[f32], top_k: usize) -> Vec<SearchResult> {
        let mut scored: Vec<SearchResult> = self
            .entries
            .iter()
            .map(|chunk| {
                let score = cosine_similarity(&chunk.embedding, query);
                SearchResult { chunk: chunk.clone(), score }
            })
            .collect();

        // Stable sort: equal scores keep insertion order.
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);

        debug!(top_k, results = scored.len(), "index search");
        scored
    }

    /// Number of chunks in the index.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no chunks.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The embedding model that produced this index's vectors.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Dimensionality of the stored vectors (0 for an empty index).
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_of_identical_vectors_is_one() {
        let v = [0.6f32, 0.8];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_of_orthogonal_vectors_is_zero() {
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
    }

    #[test]
    fn cosine_of_zero_vector_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }
}
