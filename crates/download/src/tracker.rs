//! Shared download progress rows
//!
//! Each batch handed to the orchestrator gets a row here, keyed by a
//! monotonically assigned id. UI layers poll or snapshot the rows to
//! render an overview of past and in-flight batches; updates that
//! reference an unknown id are logged and dropped rather than panicking,
//! since a stale frontend may report against a row that was never
//! registered.

use std::sync::{Mutex, PoisonError};

/// Progress state of one registered batch
#[derive(Debug, Clone)]
pub struct DownloadRow {
    pub assign_id: usize,
    /// Full names of every entry in the batch, in queue order
    pub initial_mods: Vec<String>,
    /// Entry currently being processed
    pub mod_name: String,
    pub download_progress: f64,
    pub install_progress: f64,
    pub failed: bool,
}

impl DownloadRow {
    /// Whether this row needs no further updates
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.failed || (self.download_progress >= 100.0 && self.install_progress >= 100.0)
    }
}

/// Partial update for one row; unset fields keep their current value
#[derive(Debug, Clone, Default)]
pub struct DownloadUpdate {
    pub assign_id: usize,
    pub mod_name: Option<String>,
    pub download_progress: Option<f64>,
    pub install_progress: Option<f64>,
    pub failed: Option<bool>,
}

impl DownloadUpdate {
    /// Empty update for the given row
    #[must_use]
    pub fn new(assign_id: usize) -> Self {
        Self {
            assign_id,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn mod_name(mut self, name: impl Into<String>) -> Self {
        self.mod_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn download_progress(mut self, percent: f64) -> Self {
        self.download_progress = Some(percent);
        self
    }

    #[must_use]
    pub fn install_progress(mut self, percent: f64) -> Self {
        self.install_progress = Some(percent);
        self
    }

    #[must_use]
    pub fn failed(mut self) -> Self {
        self.failed = Some(true);
        self
    }
}

/// Registry of download batches and their progress rows
#[derive(Debug, Default)]
pub struct DownloadTracker {
    rows: Mutex<Vec<DownloadRow>>,
}

impl DownloadTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new batch and return its assigned id
    pub fn add(&self, initial_mods: Vec<String>) -> usize {
        let mut rows = self.lock();
        let assign_id = rows.len();
        let mod_name = initial_mods.first().cloned().unwrap_or_default();
        rows.push(DownloadRow {
            assign_id,
            initial_mods,
            mod_name,
            download_progress: 0.0,
            install_progress: 0.0,
            failed: false,
        });
        assign_id
    }

    /// Apply a partial update. Returns `false` (after logging) when the id
    /// does not name a registered row.
    pub fn update(&self, update: DownloadUpdate) -> bool {
        let mut rows = self.lock();
        let Some(row) = rows.get_mut(update.assign_id) else {
            tracing::warn!(
                assign_id = update.assign_id,
                "download update for unregistered batch, dropping"
            );
            return false;
        };

        if let Some(name) = update.mod_name {
            row.mod_name = name;
        }
        if let Some(percent) = update.download_progress {
            row.download_progress = percent;
        }
        if let Some(percent) = update.install_progress {
            row.install_progress = percent;
        }
        if let Some(failed) = update.failed {
            row.failed = failed;
        }
        true
    }

    /// Snapshot of one row
    #[must_use]
    pub fn row(&self, assign_id: usize) -> Option<DownloadRow> {
        self.lock().get(assign_id).cloned()
    }

    /// Snapshot of every row, oldest first
    #[must_use]
    pub fn rows(&self) -> Vec<DownloadRow> {
        self.lock().clone()
    }

    /// Most recently registered row
    #[must_use]
    pub fn current(&self) -> Option<DownloadRow> {
        self.lock().last().cloned()
    }

    /// Number of rows still in flight
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.lock().iter().filter(|r| !r.is_settled()).count()
    }

    /// One-line summary of the most recent batch, for status displays
    #[must_use]
    pub fn status_line(&self) -> Option<String> {
        self.current().map(|row| {
            if row.failed {
                format!("{} failed", row.mod_name)
            } else if row.is_settled() {
                format!("{} done", row.mod_name)
            } else {
                format!("{} {:.0}%", row.mod_name, row.download_progress)
            }
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<DownloadRow>> {
        self.rows.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_ids_are_monotonic() {
        let tracker = DownloadTracker::new();
        let first = tracker.add(vec!["Team-A".to_string()]);
        let second = tracker.add(vec!["Team-B".to_string(), "Team-C".to_string()]);
        assert_eq!(first, 0);
        assert_eq!(second, 1);
        assert_eq!(tracker.rows().len(), 2);
        assert_eq!(tracker.row(second).unwrap().mod_name, "Team-B");
    }

    #[test]
    fn test_partial_update_merges() {
        let tracker = DownloadTracker::new();
        let id = tracker.add(vec!["Team-A".to_string()]);

        assert!(tracker.update(DownloadUpdate::new(id).download_progress(40.0)));
        assert!(tracker.update(DownloadUpdate::new(id).mod_name("Team-A")));

        let row = tracker.row(id).unwrap();
        assert!((row.download_progress - 40.0).abs() < f64::EPSILON);
        assert!((row.install_progress - 0.0).abs() < f64::EPSILON);
        assert!(!row.failed);
        assert_eq!(tracker.active_count(), 1);
    }

    #[test]
    fn test_unknown_id_is_dropped() {
        let tracker = DownloadTracker::new();
        assert!(!tracker.update(DownloadUpdate::new(7).failed()));
        assert!(tracker.rows().is_empty());
    }

    #[test]
    fn test_status_line_tracks_latest_batch() {
        let tracker = DownloadTracker::new();
        assert!(tracker.status_line().is_none());

        let id = tracker.add(vec!["Team-A".to_string()]);
        tracker.update(DownloadUpdate::new(id).download_progress(60.0));
        assert_eq!(tracker.status_line().as_deref(), Some("Team-A 60%"));

        tracker.update(DownloadUpdate::new(id).failed());
        assert_eq!(tracker.status_line().as_deref(), Some("Team-A failed"));
    }

    #[test]
    fn test_settlement() {
        let tracker = DownloadTracker::new();
        let id = tracker.add(vec!["Team-A".to_string()]);
        tracker.update(
            DownloadUpdate::new(id)
                .download_progress(100.0)
                .install_progress(100.0),
        );
        assert_eq!(tracker.active_count(), 0);

        let failed = tracker.add(vec!["Team-B".to_string()]);
        tracker.update(DownloadUpdate::new(failed).failed());
        assert_eq!(tracker.active_count(), 0);
        assert!(tracker.row(failed).unwrap().is_settled());
    }
}
