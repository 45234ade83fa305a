//! Knowledge base: the document directory read by the first step.
//!
//! Documents are inlined into the knowledge step's prompt as-is. There is
//! no indexing or ranking; the model does the retrieval.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info, warn};

use crate::error::KnowledgeError;

/// Maximum size of a single document (256KB).
const MAX_DOCUMENT_SIZE: u64 = 256 * 1024;

/// Maximum combined size of all documents (1MB).
const MAX_TOTAL_SIZE: u64 = 1024 * 1024;

/// File extensions treated as text documents.
const TEXT_EXTENSIONS: &[&str] = &["md", "txt", "csv", "json"];

/// One document loaded from the knowledge directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeDocument {
    /// File name relative to the knowledge directory.
    pub name: String,
    pub content: String,
}

/// Reader for a directory of sustainability documents.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    dir: PathBuf,
}

impl KnowledgeBase {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Load every text document in the directory, sorted by file name.
    ///
    /// A missing directory yields no documents. Oversized and non-UTF-8
    /// files are skipped.
    pub async fn load(&self) -> Result<Vec<KnowledgeDocument>, KnowledgeError> {
        let mut dir = match fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
                warn!(
                    dir = %self.dir.display(),
                    "Knowledge directory not found, continuing without documents"
                );
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(KnowledgeError::ReadDir {
                    path: self.dir.clone(),
                    source,
                });
            }
        };

        let mut candidates = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|source| KnowledgeError::ReadDir {
                path: self.dir.clone(),
                source,
            })?
        {
            let path = entry.path();
            if !is_text_document(&path) {
                continue;
            }
            // Follows symlinks, unlike `DirEntry::metadata`.
            let metadata = match fs::metadata(&path).await {
                Ok(metadata) => metadata,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    warn!(path = %path.display(), "Skipping dangling knowledge document link");
                    continue;
                }
                Err(source) => return Err(KnowledgeError::ReadFile { path, source }),
            };
            if metadata.is_file() {
                candidates.push((path, metadata.len()));
            } else {
                debug!(path = %path.display(), "Skipping non-file knowledge entry");
            }
        }
        candidates.sort_by(|a, b| a.0.cmp(&b.0));

        let mut documents = Vec::with_capacity(candidates.len());
        let mut total: u64 = 0;
        for (path, len) in candidates {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            if len > MAX_DOCUMENT_SIZE {
                warn!(document = %name, bytes = len, "Skipping oversized knowledge document");
                continue;
            }
            if total + len > MAX_TOTAL_SIZE {
                warn!(document = %name, total, "Knowledge size limit reached, skipping rest");
                break;
            }

            let bytes = fs::read(&path)
                .await
                .map_err(|source| KnowledgeError::ReadFile {
                    path: path.clone(),
                    source,
                })?;
            match String::from_utf8(bytes) {
                Ok(content) => {
                    debug!(document = %name, bytes = len, "Loaded knowledge document");
                    total += len;
                    documents.push(KnowledgeDocument { name, content });
                }
                Err(_) => warn!(document = %name, "Skipping non-UTF-8 knowledge document"),
            }
        }

        info!(
            dir = %self.dir.display(),
            documents = documents.len(),
            bytes = total,
            "Knowledge base loaded"
        );
        Ok(documents)
    }
}

fn is_text_document(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            TEXT_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}
