//! Storage traits and error types
//!
//! This module defines the trait interface for page stores and the
//! associated error type.

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

/// Errors that can occur while persisting a page
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot create output directory {path}: {source}")]
    CreateRoot {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("URL path escapes the output directory: {0}")]
    OutsideRoot(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for page persistence backends
///
/// Implementations are shared by every crawl worker, so they must tolerate
/// concurrent calls, including two calls that need the same parent directory.
#[async_trait]
pub trait PageStore: Send + Sync {
    /// Persists `content` under a location derived from `url`
    ///
    /// An existing page at the same location is overwritten. Returns the
    /// location written.
    async fn save_page(&self, url: &Url, content: &str) -> StorageResult<PathBuf>;
}
