#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for the modsync engine
//!
//! This crate provides the fundamental types used throughout the system:
//! catalog package records, dependency references, resolved install entries
//! and download status tracking.

pub mod package;

pub use package::{Dependency, PackageId, PackageRecord, PackageVersion, ResolvedEntry};
pub use semver::Version;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of one entry in a download batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadStatus {
    /// Queued, not yet processed
    Pending,
    /// Already present in the local content cache, no fetch needed
    Cached,
    /// Transport fetch in flight
    Downloading,
    /// Fetched bytes being persisted and extracted into the cache
    Saving,
    /// Persisted successfully
    Done,
    /// Fetch or persist failed; the remaining queue is halted
    Failed,
}

impl fmt::Display for DownloadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Cached => "cached",
            Self::Downloading => "downloading",
            Self::Saving => "saving",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

impl DownloadStatus {
    /// Terminal states do not receive further progress updates
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cached | Self::Done | Self::Failed)
    }
}
