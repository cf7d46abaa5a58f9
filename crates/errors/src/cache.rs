//! Content cache error types
//!
//! A write failure is fatal to the batch entry that triggered it and halts
//! the rest of the download queue.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum CacheError {
    #[error("failed to write {name}-{version} to cache: {message}")]
    WriteFailed {
        name: String,
        version: String,
        message: String,
    },

    #[error("invalid archive for {name}-{version}: {message}")]
    InvalidArchive {
        name: String,
        version: String,
        message: String,
    },

    #[error("cache I/O error: {message}")]
    IoError { message: String },
}
