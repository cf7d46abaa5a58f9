//! Per-entry bookkeeping for one batch item

use modsync_types::{DownloadStatus, ResolvedEntry};

/// One entry of a download batch: the resolved package, its queue
/// position, and its live status
#[derive(Debug, Clone)]
pub struct DownloadTask {
    pub entry: ResolvedEntry,
    pub position: usize,
    pub status: DownloadStatus,
    pub error: Option<String>,
}

impl DownloadTask {
    /// Create a pending task at the given queue position
    #[must_use]
    pub fn new(entry: ResolvedEntry, position: usize) -> Self {
        Self {
            entry,
            position,
            status: DownloadStatus::Pending,
            error: None,
        }
    }

    /// Advance the task to a new status
    pub fn set_status(&mut self, status: DownloadStatus) {
        self.status = status;
    }

    /// Mark the task failed with the given error message
    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = DownloadStatus::Failed;
        self.error = Some(error.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modsync_types::PackageVersion;
    use semver::Version;

    fn entry() -> ResolvedEntry {
        ResolvedEntry::new(
            "Team-Mod",
            PackageVersion {
                version_number: Version::new(1, 0, 0),
                dependencies: vec![],
                download_url: "https://cdn.example.com/mod.zip".to_string(),
                file_size: 16,
                is_deprecated: false,
            },
        )
    }

    #[test]
    fn test_lifecycle() {
        let mut task = DownloadTask::new(entry(), 2);
        assert_eq!(task.status, DownloadStatus::Pending);
        assert_eq!(task.position, 2);
        assert!(!task.status.is_terminal());

        task.set_status(DownloadStatus::Downloading);
        assert!(!task.status.is_terminal());

        task.fail("connection reset");
        assert_eq!(task.status, DownloadStatus::Failed);
        assert!(task.status.is_terminal());
        assert_eq!(task.error.as_deref(), Some("connection reset"));
    }
}
