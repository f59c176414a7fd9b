//! Build-or-load lifecycle tests for the index manager.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use oracle_rag::config::RagConfig;
use oracle_rag::embedding::EmbeddingProvider;
use oracle_rag::error::Result;
use oracle_rag::index::INDEX_FILE;
use oracle_rag::manager::IndexManager;
use oracle_rag::retriever::Retriever;

/// Deterministic embedder: a normalized letter-frequency histogram.
///
/// Texts with similar letter distributions score high on cosine similarity,
/// which is enough signal for retrieval assertions. Counts every embedding
/// call so tests can detect rebuilds versus cache hits.
struct CountingEmbedder {
    model: String,
    batch_calls: AtomicUsize,
    texts_embedded: AtomicUsize,
}

impl CountingEmbedder {
    fn new(model: &str) -> Self {
        Self {
            model: model.to_string(),
            batch_calls: AtomicUsize::new(0),
            texts_embedded: AtomicUsize::new(0),
        }
    }

    fn vector_for(text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; 26];
        for c in text.chars().filter(|c| c.is_ascii_alphabetic()) {
            let i = (c.to_ascii_lowercase() as u8 - b'a') as usize;
            v[i] += 1.0;
        }
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut v {
                *x /= norm;
            }
        }
        v
    }
}

#[async_trait]
impl EmbeddingProvider for CountingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(Self::vector_for(text))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        self.texts_embedded.fetch_add(texts.len(), Ordering::SeqCst);
        Ok(texts.iter().map(|t| Self::vector_for(t)).collect())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn write_corpus(dir: &Path) {
    std::fs::write(dir.join("fruit.txt"), "apples and bananas and apples again").unwrap();
    std::fs::write(dir.join("metal.txt"), "zinc zirconium quartz quizzes").unwrap();
}

fn manager_with(
    corpus: &Path,
    index: &Path,
    embedder: Arc<CountingEmbedder>,
) -> IndexManager {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    IndexManager::new(RagConfig::default(), corpus, index, embedder)
}

#[tokio::test]
async fn first_call_builds_and_persists_the_index() {
    let corpus = tempfile::tempdir().unwrap();
    let index_dir = tempfile::tempdir().unwrap();
    write_corpus(corpus.path());

    let embedder = Arc::new(CountingEmbedder::new("letter-freq"));
    let manager = manager_with(corpus.path(), index_dir.path(), embedder.clone());

    let index = manager.get_index().await.unwrap();
    assert_eq!(index.len(), 2);
    assert_eq!(index.model(), "letter-freq");
    assert!(embedder.batch_calls.load(Ordering::SeqCst) > 0);
    assert!(index_dir.path().join(INDEX_FILE).is_file());
}

#[tokio::test]
async fn repeat_calls_are_memoized_with_zero_embedding_work() {
    let corpus = tempfile::tempdir().unwrap();
    let index_dir = tempfile::tempdir().unwrap();
    write_corpus(corpus.path());

    let embedder = Arc::new(CountingEmbedder::new("letter-freq"));
    let manager = manager_with(corpus.path(), index_dir.path(), embedder.clone());

    let first = manager.get_index().await.unwrap();
    let calls_after_build = embedder.batch_calls.load(Ordering::SeqCst);

    let second = manager.get_index().await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(embedder.batch_calls.load(Ordering::SeqCst), calls_after_build);
}

#[tokio::test]
async fn fresh_process_loads_persisted_index_without_re_embedding() {
    let corpus = tempfile::tempdir().unwrap();
    let index_dir = tempfile::tempdir().unwrap();
    write_corpus(corpus.path());

    let builder = Arc::new(CountingEmbedder::new("letter-freq"));
    manager_with(corpus.path(), index_dir.path(), builder)
        .get_index()
        .await
        .unwrap();

    // A new manager over the same index directory stands in for a restart.
    let loader = Arc::new(CountingEmbedder::new("letter-freq"));
    let manager = manager_with(corpus.path(), index_dir.path(), loader.clone());
    let index = manager.get_index().await.unwrap();

    assert_eq!(index.len(), 2);
    assert_eq!(loader.batch_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn deleting_the_index_directory_forces_a_rebuild() {
    let corpus = tempfile::tempdir().unwrap();
    let index_dir = tempfile::tempdir().unwrap();
    write_corpus(corpus.path());

    let first = Arc::new(CountingEmbedder::new("letter-freq"));
    manager_with(corpus.path(), index_dir.path(), first)
        .get_index()
        .await
        .unwrap();

    std::fs::remove_file(index_dir.path().join(INDEX_FILE)).unwrap();

    let second = Arc::new(CountingEmbedder::new("letter-freq"));
    let manager = manager_with(corpus.path(), index_dir.path(), second.clone());
    manager.get_index().await.unwrap();
    assert!(second.batch_calls.load(Ordering::SeqCst) > 0);
}

#[tokio::test]
async fn corrupt_persisted_index_falls_back_to_rebuild() {
    let corpus = tempfile::tempdir().unwrap();
    let index_dir = tempfile::tempdir().unwrap();
    write_corpus(corpus.path());
    std::fs::write(index_dir.path().join(INDEX_FILE), "garbage").unwrap();

    let embedder = Arc::new(CountingEmbedder::new("letter-freq"));
    let manager = manager_with(corpus.path(), index_dir.path(), embedder.clone());

    let index = manager.get_index().await.unwrap();
    assert_eq!(index.len(), 2);
    assert!(embedder.batch_calls.load(Ordering::SeqCst) > 0);
}

#[tokio::test]
async fn embedding_model_change_triggers_a_rebuild() {
    let corpus = tempfile::tempdir().unwrap();
    let index_dir = tempfile::tempdir().unwrap();
    write_corpus(corpus.path());

    let old_model = Arc::new(CountingEmbedder::new("model-v1"));
    manager_with(corpus.path(), index_dir.path(), old_model)
        .get_index()
        .await
        .unwrap();

    let new_model = Arc::new(CountingEmbedder::new("model-v2"));
    let manager = manager_with(corpus.path(), index_dir.path(), new_model.clone());
    let index = manager.get_index().await.unwrap();

    assert_eq!(index.model(), "model-v2");
    assert!(new_model.batch_calls.load(Ordering::SeqCst) > 0);
}

#[tokio::test]
async fn concurrent_first_calls_build_exactly_once() {
    let corpus = tempfile::tempdir().unwrap();
    let index_dir = tempfile::tempdir().unwrap();
    write_corpus(corpus.path());

    let embedder = Arc::new(CountingEmbedder::new("letter-freq"));
    let manager =
        Arc::new(manager_with(corpus.path(), index_dir.path(), embedder.clone()));

    let a = tokio::spawn({
        let manager = manager.clone();
        async move { manager.get_index().await.unwrap().len() }
    });
    let b = tokio::spawn({
        let manager = manager.clone();
        async move { manager.get_index().await.unwrap().len() }
    });

    assert_eq!(a.await.unwrap(), 2);
    assert_eq!(b.await.unwrap(), 2);
    assert_eq!(embedder.batch_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn retrieve_returns_the_most_similar_source_first() {
    let corpus = tempfile::tempdir().unwrap();
    let index_dir = tempfile::tempdir().unwrap();
    write_corpus(corpus.path());

    let embedder = Arc::new(CountingEmbedder::new("letter-freq"));
    let manager = manager_with(corpus.path(), index_dir.path(), embedder);

    let results = manager.retrieve("apples bananas", 2).await.unwrap();
    assert!(!results.is_empty());
    assert_eq!(results[0].chunk.source, "fruit.txt");
}

/// Embedder whose vectors point in opposite directions depending on a
/// keyword, so one document always scores a cosine of -1 against the query.
struct SignedEmbedder;

#[async_trait]
impl EmbeddingProvider for SignedEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.contains("sun") { Ok(vec![1.0, 0.0]) } else { Ok(vec![-1.0, 0.0]) }
    }

    fn model_name(&self) -> &str {
        "signed"
    }
}

#[tokio::test]
async fn retrieve_keeps_negative_score_hits_by_default() {
    let corpus = tempfile::tempdir().unwrap();
    let index_dir = tempfile::tempdir().unwrap();
    std::fs::write(corpus.path().join("sun.txt"), "sun").unwrap();
    std::fs::write(corpus.path().join("moon.txt"), "moon").unwrap();

    let manager = IndexManager::new(
        RagConfig::default(),
        corpus.path(),
        index_dir.path(),
        Arc::new(SignedEmbedder),
    );

    // An index with fewer entries than k returns all of them, even the
    // one the query points directly away from.
    let results = manager.retrieve("moonlight", 5).await.unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].chunk.source, "moon.txt");
    assert!(results[1].score < 0.0);
}

#[tokio::test]
async fn explicit_similarity_threshold_filters_low_scores() {
    let corpus = tempfile::tempdir().unwrap();
    let index_dir = tempfile::tempdir().unwrap();
    std::fs::write(corpus.path().join("sun.txt"), "sun").unwrap();
    std::fs::write(corpus.path().join("moon.txt"), "moon").unwrap();

    let config = RagConfig::builder().similarity_threshold(0.0).build().unwrap();
    let manager =
        IndexManager::new(config, corpus.path(), index_dir.path(), Arc::new(SignedEmbedder));

    let results = manager.retrieve("moonlight", 5).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].chunk.source, "moon.txt");
}

#[tokio::test]
async fn empty_corpus_yields_an_empty_index_and_empty_results() {
    let corpus = tempfile::tempdir().unwrap();
    let index_dir = tempfile::tempdir().unwrap();

    let embedder = Arc::new(CountingEmbedder::new("letter-freq"));
    let manager = manager_with(corpus.path(), index_dir.path(), embedder);

    let index = manager.get_index().await.unwrap();
    assert!(index.is_empty());

    let results = manager.retrieve("anything", 5).await.unwrap();
    assert!(results.is_empty());
}
