//! CLI error type

use thiserror::Error;

/// Top-level error for the CLI application
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Engine(#[from] modsync_errors::Error),

    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
}
