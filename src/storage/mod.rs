//! Storage module for persisting fetched pages
//!
//! This module handles:
//! - Mapping page URLs onto a directory tree under the output root
//! - Creating intermediate directories (idempotently, under concurrency)
//! - Writing each page atomically at single-file granularity

mod file;
mod layout;
mod traits;

pub use file::FileStore;
pub use layout::{page_path, INDEX_FILE};
pub use traits::{PageStore, StorageError, StorageResult};
