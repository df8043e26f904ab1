//! Output artifacts on the local filesystem.
//!
//! Documents land in `<root>/outputs/memorias/<id>_<YYYYMMDD_HHMMSS>.docx`,
//! with the extraction JSON beside them. Each file is written to a temp file
//! in the target directory and then persisted without overwriting, so
//! concurrent runs never see or clobber each other's partial output.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use memoria_core::{ErrorCode, MemoriaError, MemoriaResult};
use tempfile::NamedTempFile;
use tracing::{debug, info};

const OUTPUT_DIR: [&str; 2] = ["outputs", "memorias"];
const MAX_SUFFIX: u32 = 1000;

/// Paths of the stored artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredOutput {
    pub document: PathBuf,
    pub data: Option<PathBuf>,
}

/// Destination for rendered memorias.
#[async_trait]
pub trait OutputStore: Send + Sync {
    /// Store a document and, optionally, its extraction JSON.
    async fn store(
        &self,
        document_id: &str,
        generated_at: NaiveDateTime,
        document: Vec<u8>,
        data: Option<Vec<u8>>,
    ) -> MemoriaResult<StoredOutput>;
}

/// Keep only characters that are safe in a file name.
pub fn sanitize_id(document_id: &str) -> String {
    let cleaned: String = document_id
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "sin_id".to_string()
    } else {
        cleaned
    }
}

/// `<id>_<YYYYMMDD_HHMMSS>`.
pub fn file_stem(document_id: &str, generated_at: NaiveDateTime) -> String {
    format!(
        "{}_{}",
        sanitize_id(document_id),
        generated_at.format("%Y%m%d_%H%M%S")
    )
}

fn storage_error(message: String, path: &Path, source: std::io::Error) -> MemoriaError {
    MemoriaError::Storage {
        message: format!("{message} {}: {source}", path.display()),
        code: ErrorCode::StoWriteFailed,
        source: Some(Box::new(source)),
    }
}

/// Stores artifacts under a root directory.
#[derive(Debug, Clone)]
pub struct FsOutputStore {
    dir: PathBuf,
}

impl FsOutputStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let mut dir = root.as_ref().to_path_buf();
        dir.extend(OUTPUT_DIR);
        Self { dir }
    }

    /// Directory the artifacts are written to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn temp_file(&self, bytes: &[u8]) -> MemoriaResult<NamedTempFile> {
        let mut file = NamedTempFile::new_in(&self.dir)
            .map_err(|e| storage_error("cannot create temp file in".into(), &self.dir, e))?;
        file.write_all(bytes)
            .and_then(|_| file.as_file().sync_all())
            .map_err(|e| storage_error("cannot write temp file in".into(), &self.dir, e))?;
        Ok(file)
    }

    /// Persist the document under the first free stem, returning that stem.
    fn persist_document(&self, stem: &str, bytes: &[u8]) -> MemoriaResult<(String, PathBuf)> {
        let mut file = self.temp_file(bytes)?;
        for n in 0..MAX_SUFFIX {
            let candidate = if n == 0 {
                stem.to_string()
            } else {
                format!("{stem}_{n}")
            };
            let path = self.dir.join(format!("{candidate}.docx"));
            // A data file without its document still reserves the stem.
            if self.dir.join(format!("{candidate}.json")).exists() {
                continue;
            }
            match file.persist_noclobber(&path) {
                Ok(_) => return Ok((candidate, path)),
                Err(e) if e.error.kind() == ErrorKind::AlreadyExists => {
                    debug!(path = %path.display(), "output name taken");
                    file = e.file;
                }
                Err(e) => return Err(storage_error("cannot persist".into(), &path, e.error)),
            }
        }
        Err(MemoriaError::Storage {
            message: format!("no free output name for {stem} after {MAX_SUFFIX} attempts"),
            code: ErrorCode::StoCollision,
            source: None,
        })
    }

    fn store_blocking(
        &self,
        stem: &str,
        document: &[u8],
        data: Option<&[u8]>,
    ) -> MemoriaResult<StoredOutput> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| storage_error("cannot create".into(), &self.dir, e))?;

        let (stem, document_path) = self.persist_document(stem, document)?;

        let data_path = match data {
            Some(bytes) => {
                let path = self.dir.join(format!("{stem}.json"));
                self.temp_file(bytes)?
                    .persist_noclobber(&path)
                    .map_err(|e| storage_error("cannot persist".into(), &path, e.error))?;
                Some(path)
            }
            None => None,
        };

        Ok(StoredOutput {
            document: document_path,
            data: data_path,
        })
    }
}

#[async_trait]
impl OutputStore for FsOutputStore {
    async fn store(
        &self,
        document_id: &str,
        generated_at: NaiveDateTime,
        document: Vec<u8>,
        data: Option<Vec<u8>>,
    ) -> MemoriaResult<StoredOutput> {
        let stem = file_stem(document_id, generated_at);
        let store = self.clone();

        // Filesystem writes run on the blocking pool.
        let stored = tokio::task::spawn_blocking(move || {
            store.store_blocking(&stem, &document, data.as_deref())
        })
        .await
        .map_err(|e| MemoriaError::Internal(format!("storage task failed: {e}")))??;

        info!(
            document_id,
            path = %stored.document.display(),
            "memoria stored"
        );
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 11, 3)
            .and_then(|d| d.and_hms_opt(16, 5, 42))
            .unwrap()
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("17", at()), "17_20241103_160542");
        assert_eq!(file_stem("plano 3/b", at()), "plano_3_b_20241103_160542");
        assert_eq!(file_stem("  ", at()), "sin_id_20241103_160542");
    }

    #[tokio::test]
    async fn test_store_layout() {
        let root = tempfile::tempdir().unwrap();
        let store = FsOutputStore::new(root.path());
        let stored = store
            .store("17", at(), b"docx".to_vec(), Some(b"{}".to_vec()))
            .await
            .unwrap();

        let dir = root.path().join("outputs").join("memorias");
        assert_eq!(stored.document, dir.join("17_20241103_160542.docx"));
        assert_eq!(stored.data, Some(dir.join("17_20241103_160542.json")));
        assert_eq!(std::fs::read(&stored.document).unwrap(), b"docx");
        assert_eq!(std::fs::read_to_string(stored.data.unwrap()).unwrap(), "{}");
    }

    #[tokio::test]
    async fn test_collisions_get_suffix() {
        let root = tempfile::tempdir().unwrap();
        let store = FsOutputStore::new(root.path());
        let first = store.store("9", at(), b"a".to_vec(), None).await.unwrap();
        let second = store
            .store("9", at(), b"b".to_vec(), Some(b"{}".to_vec()))
            .await
            .unwrap();

        assert!(first.document.ends_with("9_20241103_160542.docx"));
        assert!(second.document.ends_with("9_20241103_160542_1.docx"));
        assert!(second.data.unwrap().ends_with("9_20241103_160542_1.json"));
        assert_eq!(std::fs::read(&first.document).unwrap(), b"a");
    }

    #[tokio::test]
    async fn test_no_temp_files_left() {
        let root = tempfile::tempdir().unwrap();
        let store = FsOutputStore::new(root.path());
        store.store("1", at(), b"x".to_vec(), Some(b"{}".to_vec())).await.unwrap();
        let entries = std::fs::read_dir(store.dir()).unwrap().count();
        assert_eq!(entries, 2);
    }
}
