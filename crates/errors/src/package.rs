//! Package-related error types

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum PackageError {
    #[error("package not found: {name}")]
    NotFound { name: String },

    #[error("version {version} of {name} not found in catalog")]
    VersionNotFound { name: String, version: String },

    #[error("package {name} has no versions")]
    NoVersions { name: String },

    #[error("invalid package full name: {input}")]
    InvalidFullName { input: String },

    #[error("invalid version: {message}")]
    InvalidVersion { message: String },

    #[error("invalid dependency string: {input}")]
    InvalidDependency { input: String },
}
