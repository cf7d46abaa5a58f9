//! Domain event definitions

use modsync_types::{DownloadStatus, ResolvedEntry};
use serde::Serialize;

/// Top-level event type, grouped by functional domain
#[derive(Debug, Clone, Serialize)]
pub enum AppEvent {
    Sync(SyncEvent),
    Download(DownloadEvent),
    General(GeneralEvent),
}

/// Catalog synchronization events
#[derive(Debug, Clone, Serialize)]
pub enum SyncEvent {
    /// Synchronization for a community has begun
    Started { community: String },
    /// One more unit of work finished. The index fetch counts as one unit
    /// alongside the chunks, so `total` is `chunk_count + 1`.
    Progress {
        community: String,
        completed: usize,
        total: usize,
        percent: f64,
    },
    /// The stored index hash matched the remote one; only the timestamp
    /// was bumped
    UpToDate { community: String },
    /// New catalog content was persisted
    Completed {
        community: String,
        package_count: usize,
    },
    /// The synchronization attempt was aborted; stored state is untouched
    Failed { community: String, error: String },
}

/// Download batch events
///
/// Events for entries within one batch are emitted strictly in list order;
/// no event for entry N+1 precedes the terminal event for entry N.
#[derive(Debug, Clone, Serialize)]
pub enum DownloadEvent {
    /// A batch began processing. `to_download` excludes cache hits unless
    /// cache honoring is disabled.
    BatchStarted {
        batch: usize,
        to_download: usize,
        total: usize,
    },
    /// Per-entry progress. `percent` is the overall batch percentage,
    /// smooth across entries.
    Progress {
        batch: usize,
        full_name: String,
        status: DownloadStatus,
        percent: f64,
    },
    /// An entry failed; the remaining queue is halted and `Completed`
    /// will not fire for this batch.
    Failed {
        batch: usize,
        full_name: String,
        error: String,
    },
    /// Every entry reached DONE or CACHED. Carries the full resolved list
    /// (cache hits included) so the caller can install all of them
    /// uniformly.
    Completed {
        batch: usize,
        entries: Vec<ResolvedEntry>,
    },
}

/// General diagnostics
#[derive(Debug, Clone, Serialize)]
pub enum GeneralEvent {
    Debug { message: String },
    Warning { message: String },
    Error { message: String },
}

impl GeneralEvent {
    pub fn debug(message: impl Into<String>) -> Self {
        Self::Debug {
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::Warning {
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}
