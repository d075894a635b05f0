//! Local filesystem page store
//!
//! Pages are written atomically: content goes to a uniquely named temporary
//! file beside the target, which is then renamed over it. A crash mid-crawl
//! leaves only complete pages behind.

use crate::storage::{page_path, PageStore, StorageError, StorageResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::AsyncWriteExt;
use url::Url;

/// Mirror tree rooted at a local directory
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    required_prefix: String,
    tmp_counter: AtomicU64,
}

impl FileStore {
    /// Opens a store rooted at `root`, creating the directory if absent
    ///
    /// Failure here is fatal to the crawl, so it is reported with the path.
    pub fn create(root: impl Into<PathBuf>, required_prefix: &str) -> StorageResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|source| StorageError::CreateRoot {
            path: root.clone(),
            source,
        })?;

        Ok(Self {
            root,
            required_prefix: required_prefix.to_string(),
            tmp_counter: AtomicU64::new(0),
        })
    }

    /// Root directory as an absolute path
    pub fn absolute_root(&self) -> PathBuf {
        std::fs::canonicalize(&self.root).unwrap_or_else(|_| self.root.clone())
    }

    /// Path a URL would be written to
    pub fn path_for(&self, url: &Url) -> StorageResult<PathBuf> {
        page_path(url, &self.root, &self.required_prefix)
    }

    /// Write bytes atomically (write to temp, then rename)
    async fn write_atomic(&self, path: &Path, bytes: &[u8]) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            // Idempotent: concurrent creation of the same directory is not an error
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = self.temp_path(path);
        let result = async {
            let mut file = tokio::fs::File::create(&tmp).await?;
            file.write_all(bytes).await?;
            file.flush().await?;
            drop(file);
            tokio::fs::rename(&tmp, path).await
        }
        .await;

        if let Err(e) = result {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(StorageError::Io(e));
        }

        Ok(())
    }

    fn temp_path(&self, path: &Path) -> PathBuf {
        let n = self.tmp_counter.fetch_add(1, Ordering::Relaxed);
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        path.with_file_name(format!(".{}.{}-{}.tmp", name, std::process::id(), n))
    }
}

#[async_trait]
impl PageStore for FileStore {
    async fn save_page(&self, url: &Url, content: &str) -> StorageResult<PathBuf> {
        let path = self.path_for(url)?;
        self.write_atomic(&path, content.as_bytes()).await?;
        Ok(path)
    }
}
