//! Corpus document loading.
//!
//! [`CorpusLoader`] walks a corpus directory, extracts text from each
//! supported file, and tags every extracted [`Document`] with its
//! originating file name. Subdirectories and unsupported extensions are
//! ignored.
//!
//! Supported formats:
//!
//! - `txt`, `md` — read as UTF-8 text
//! - `pdf` — extracted via the `pdftotext` system binary
//! - `docx` — `word/document.xml` pulled from the archive, tags stripped
//!
//! Per-file failures are handled according to the configured
//! [`LoadErrorPolicy`]: the default skips the file with a warning so one
//! corrupt document cannot abort a whole corpus build.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use regex::Regex;
use tokio::process::Command;
use tracing::{info, warn};

use crate::config::LoadErrorPolicy;
use crate::document::Document;
use crate::error::{RagError, Result};

/// File extensions the loader will attempt to extract text from.
const SUPPORTED_EXTENSIONS: &[&str] = &["txt", "md", "pdf", "docx"];

/// Loads documents from a corpus directory.
#[derive(Debug, Clone)]
pub struct CorpusLoader {
    on_load_error: LoadErrorPolicy,
}

impl Default for CorpusLoader {
    fn default() -> Self {
        Self::new(LoadErrorPolicy::SkipAndContinue)
    }
}

impl CorpusLoader {
    /// Create a loader with the given per-file failure policy.
    pub fn new(on_load_error: LoadErrorPolicy) -> Self {
        Self { on_load_error }
    }

    /// Load every supported file in `dir` as a [`Document`].
    ///
    /// Files are processed in lexicographic file-name order so the
    /// resulting document (and therefore chunk) sequence is deterministic
    /// for a fixed corpus snapshot. Files that yield no text are dropped
    /// with a log line regardless of policy; emptiness is not a failure.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Io`] if the directory itself cannot be read,
    /// and [`RagError::Load`] for a failing file when the policy is
    /// [`LoadErrorPolicy::Abort`]. Under the default skip-and-continue
    /// policy, per-file failures are logged and the file is dropped.
    pub async fn load_dir(&self, dir: &Path) -> Result<Vec<Document>> {
        let mut paths: Vec<PathBuf> = Vec::new();
        let mut entries = tokio::fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let supported = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
                .unwrap_or(false);
            if supported {
                paths.push(path);
            }
        }
        paths.sort();

        let mut documents = Vec::new();
        for path in paths {
            match self.load_file(&path).await {
                // An empty file is a valid corpus member that simply
                // contributes no chunks; it is dropped here rather than
                // treated as a load failure.
                Ok(document) if document.text.trim().is_empty() => {
                    info!(file = %path.display(), "skipping document with no extractable text");
                }
                Ok(document) => {
                    info!(file = %path.display(), chars = document.text.len(), "loaded document");
                    documents.push(document);
                }
                Err(e) => match self.on_load_error {
                    LoadErrorPolicy::SkipAndContinue => {
                        warn!(file = %path.display(), error = %e, "skipping unreadable document");
                    }
                    LoadErrorPolicy::Abort => return Err(e),
                },
            }
        }

        Ok(documents)
    }

    /// Load a single file as a [`Document`].
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Load`] if the file cannot be read or its
    /// format's extractor fails.
    pub async fn load_file(&self, path: &Path) -> Result<Document> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| load_error(path, "file name is not valid UTF-8"))?
            .to_string();

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        let text = match extension.as_str() {
            "txt" | "md" => tokio::fs::read_to_string(path)
                .await
                .map_err(|e| load_error(path, &e.to_string()))?,
            "pdf" => {
                let data =
                    tokio::fs::read(path).await.map_err(|e| load_error(path, &e.to_string()))?;
                extract_pdf_text(path, &data).await?
            }
            "docx" => {
                let data =
                    tokio::fs::read(path).await.map_err(|e| load_error(path, &e.to_string()))?;
                extract_docx_text(path, &data)?
            }
            other => {
                return Err(load_error(path, &format!("unsupported extension '{other}'")));
            }
        };

        Ok(Document::new(file_name, text))
    }
}

fn load_error(path: &Path, message: &str) -> RagError {
    RagError::Load { file: path.to_path_buf(), message: message.to_string() }
}

static PDF_TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A temp path unique within the process, so concurrent extractions never
/// write over each other.
fn pdf_temp_path() -> PathBuf {
    let n = PDF_TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("oracle_rag_{}_{n}.pdf", std::process::id()))
}

/// Extract PDF text with the `pdftotext` system binary.
async fn extract_pdf_text(path: &Path, data: &[u8]) -> Result<String> {
    let temp_file = pdf_temp_path();

    tokio::fs::write(&temp_file, data)
        .await
        .map_err(|e| load_error(path, &format!("failed to write temp PDF: {e}")))?;

    let output = Command::new("pdftotext")
        .arg("-layout")
        .arg("-enc")
        .arg("UTF-8")
        .arg(&temp_file)
        .arg("-")
        .output()
        .await;

    let _ = tokio::fs::remove_file(&temp_file).await;

    let output = output.map_err(|e| load_error(path, &format!("pdftotext failed to run: {e}")))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(load_error(path, &format!("pdftotext exited with error: {stderr}")));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Extract DOCX text by reading `word/document.xml` out of the archive
/// and stripping the WordprocessingML markup.
fn extract_docx_text(path: &Path, data: &[u8]) -> Result<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data))
        .map_err(|e| load_error(path, &format!("not a valid docx archive: {e}")))?;

    let mut xml = String::new();
    {
        use std::io::Read;
        let mut entry = archive
            .by_name("word/document.xml")
            .map_err(|e| load_error(path, &format!("missing word/document.xml: {e}")))?;
        entry
            .read_to_string(&mut xml)
            .map_err(|e| load_error(path, &format!("failed to read document.xml: {e}")))?;
    }

    // Paragraph ends become newlines before markup is stripped.
    let with_breaks = xml.replace("</w:p>", "\n");
    let tag = Regex::new(r"<[^>]+>")
        .map_err(|e| load_error(path, &format!("invalid markup pattern: {e}")))?;
    let text = tag.replace_all(&with_breaks, "");

    Ok(text
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn loads_plain_text_and_tags_source() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "hello corpus").unwrap();

        let docs = CorpusLoader::default().load_dir(dir.path()).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].source, "notes.txt");
        assert_eq!(docs[0].text, "hello corpus");
    }

    #[tokio::test]
    async fn ignores_unsupported_extensions_and_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("image.png"), [0u8, 1, 2]).unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested").join("inner.txt"), "hidden").unwrap();
        std::fs::write(dir.path().join("kept.md"), "# kept").unwrap();

        let docs = CorpusLoader::default().load_dir(dir.path()).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].source, "kept.md");
    }

    #[tokio::test]
    async fn skips_unparseable_files_by_default() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.docx"), b"not a zip").unwrap();
        std::fs::write(dir.path().join("ok.txt"), "fine").unwrap();

        let docs = CorpusLoader::default().load_dir(dir.path()).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].source, "ok.txt");
    }

    #[tokio::test]
    async fn empty_files_are_dropped_without_failing_the_build() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("empty.txt"), "").unwrap();
        std::fs::write(dir.path().join("blank.md"), "  \n\t\n").unwrap();
        std::fs::write(dir.path().join("ok.txt"), "fine").unwrap();

        // Abort is the strict policy; an empty file still must not trip it.
        let docs = CorpusLoader::new(LoadErrorPolicy::Abort)
            .load_dir(dir.path())
            .await
            .unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].source, "ok.txt");
    }

    #[test]
    fn pdf_temp_paths_are_unique_within_the_process() {
        assert_ne!(pdf_temp_path(), pdf_temp_path());
    }

    #[tokio::test]
    async fn abort_policy_surfaces_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.docx"), b"not a zip").unwrap();

        let err = CorpusLoader::new(LoadErrorPolicy::Abort)
            .load_dir(dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::Load { .. }));
    }

    #[tokio::test]
    async fn documents_come_back_in_file_name_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.txt"), "second").unwrap();
        std::fs::write(dir.path().join("a.txt"), "first").unwrap();

        let docs = CorpusLoader::default().load_dir(dir.path()).await.unwrap();
        let sources: Vec<&str> = docs.iter().map(|d| d.source.as_str()).collect();
        assert_eq!(sources, vec!["a.txt", "b.txt"]);
    }
}
