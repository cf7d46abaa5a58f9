//! Catalog synchronization error types
//!
//! Fetch errors mean the remote index could not be retrieved after the
//! retry budget was spent. Format errors mean the index or a chunk was
//! structurally invalid. Both abort the synchronization attempt and leave
//! previously persisted catalog state untouched.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("failed to fetch catalog index for {community}: {message}")]
    FetchFailed { community: String, message: String },

    #[error("catalog index is not a chunk list: {message}")]
    InvalidIndex { message: String },

    #[error("received empty chunk index from API")]
    EmptyIndex,

    #[error("chunk #{index} in multichunk response was empty")]
    EmptyChunk { index: usize },

    #[error("chunk #{index} was invalid format: {message}")]
    InvalidChunk { index: usize, message: String },

    #[error("catalog store error: {message}")]
    StoreError { message: String },
}
