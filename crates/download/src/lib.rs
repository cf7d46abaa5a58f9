#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Sequential download orchestration
//!
//! A batch is a resolved list of package versions processed strictly in
//! order: each entry is checked against the content cache, fetched in a
//! single attempt if absent, then extracted into the cache. The first
//! failure halts the remaining queue and the batch never completes.
//! Progress is reported as one smooth percentage across the whole batch.

mod task;
mod tracker;

pub use task::DownloadTask;
pub use tracker::{DownloadRow, DownloadTracker, DownloadUpdate};

use std::collections::HashSet;
use std::sync::Arc;

use semver::Version;
use tokio_util::sync::CancellationToken;

use modsync_cache::ModCache;
use modsync_catalog::Snapshot;
use modsync_errors::{Error, PackageError};
use modsync_events::{AppEvent, DownloadEvent, EventEmitter, EventSender};
use modsync_net::{fetch_bytes_with_progress, NetClient};
use modsync_resolver::resolve_latest;
use modsync_types::{DownloadStatus, ResolvedEntry};

/// Overall batch percentage while entry `current_index` (zero-based) of
/// `total` is at `progress` percent
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn generate_progress_percentage(progress: f64, current_index: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    ((current_index as f64 + progress / 100.0) / total as f64) * 100.0
}

/// Sequential batch downloader
///
/// Owns the transport client and the content cache, and shares a
/// [`DownloadTracker`] with any UI layer that wants per-batch rows.
pub struct Downloader {
    client: NetClient,
    cache: ModCache,
    tracker: Arc<DownloadTracker>,
    tx: Option<EventSender>,
    cancel: Option<CancellationToken>,
}

impl Downloader {
    #[must_use]
    pub fn new(client: NetClient, cache: ModCache) -> Self {
        Self {
            client,
            cache,
            tracker: Arc::new(DownloadTracker::new()),
            tx: None,
            cancel: None,
        }
    }

    /// Attach an event channel for progress reporting
    #[must_use]
    pub fn with_events(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    /// Attach a cancellation token, checked between entries
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Shared batch rows
    #[must_use]
    pub fn tracker(&self) -> Arc<DownloadTracker> {
        Arc::clone(&self.tracker)
    }

    /// Download a package and its transitive dependencies
    ///
    /// The requested package is pinned to the given version; dependencies
    /// resolve to their latest catalog versions, first occurrence winning.
    ///
    /// # Errors
    ///
    /// Returns an error if the package or version is absent from the
    /// snapshot, or if any entry in the batch fails to download or persist.
    pub async fn download(
        &self,
        full_name: &str,
        version: &Version,
        snapshot: &Snapshot,
        ignore_cache: bool,
    ) -> Result<Vec<ResolvedEntry>, Error> {
        let entries = resolve_latest(full_name, version, snapshot)?;
        self.process_batch(entries, ignore_cache).await
    }

    /// Download the latest version of each named package plus dependencies
    ///
    /// Per-package resolutions are merged into one batch with first-wins
    /// deduplication across the whole list.
    ///
    /// # Errors
    ///
    /// Returns an error if any named package is absent from the snapshot
    /// or has no versions, or if any entry fails to download or persist.
    pub async fn download_latest_of_all(
        &self,
        full_names: &[String],
        snapshot: &Snapshot,
        ignore_cache: bool,
    ) -> Result<Vec<ResolvedEntry>, Error> {
        let mut combined = Vec::new();
        let mut seen = HashSet::new();

        for full_name in full_names {
            let record = snapshot
                .get(full_name)
                .ok_or_else(|| PackageError::NotFound {
                    name: full_name.clone(),
                })?;
            let latest = record.latest().ok_or_else(|| PackageError::NoVersions {
                name: full_name.clone(),
            })?;

            let resolved = resolve_latest(full_name, &latest.version_number, snapshot)?;
            for entry in resolved {
                if seen.insert(entry.full_name.clone()) {
                    combined.push(entry);
                }
            }
        }

        self.process_batch(combined, ignore_cache).await
    }

    /// Download an externally supplied exact-version list
    ///
    /// The list is taken as already complete: entries are pinned verbatim
    /// and dependencies are not recursed into.
    ///
    /// # Errors
    ///
    /// Returns an error if any listed package or version is absent from
    /// the snapshot, or if any entry fails to download or persist.
    pub async fn download_imported(
        &self,
        imports: &[(String, Version)],
        snapshot: &Snapshot,
        ignore_cache: bool,
    ) -> Result<Vec<ResolvedEntry>, Error> {
        let mut entries = Vec::with_capacity(imports.len());

        for (full_name, version) in imports {
            let record = snapshot
                .get(full_name)
                .ok_or_else(|| PackageError::NotFound {
                    name: full_name.clone(),
                })?;
            let chosen =
                record
                    .get_version(version)
                    .ok_or_else(|| PackageError::VersionNotFound {
                        name: full_name.clone(),
                        version: version.to_string(),
                    })?;
            entries.push(ResolvedEntry::new(full_name.clone(), chosen.clone()));
        }

        self.process_batch(entries, ignore_cache).await
    }

    /// Whether the entry's exact version already sits in the cache
    pub async fn is_version_already_downloaded(&self, entry: &ResolvedEntry) -> bool {
        self.cache
            .exists(&entry.full_name, &entry.version.version_number)
            .await
    }

    /// How many entries actually need fetching. Cache hits are excluded
    /// unless cache honoring is disabled, in which case every entry counts.
    pub async fn calculate_initial_download_size(
        &self,
        entries: &[ResolvedEntry],
        ignore_cache: bool,
    ) -> usize {
        if ignore_cache {
            return entries.len();
        }
        let mut count = 0;
        for entry in entries {
            if !self.is_version_already_downloaded(entry).await {
                count += 1;
            }
        }
        count
    }

    async fn process_batch(
        &self,
        entries: Vec<ResolvedEntry>,
        ignore_cache: bool,
    ) -> Result<Vec<ResolvedEntry>, Error> {
        let total = entries.len();
        let to_download = self
            .calculate_initial_download_size(&entries, ignore_cache)
            .await;
        let batch = self
            .tracker
            .add(entries.iter().map(|e| e.full_name.clone()).collect());

        self.emit(AppEvent::Download(DownloadEvent::BatchStarted {
            batch,
            to_download,
            total,
        }));

        for (index, entry) in entries.iter().enumerate() {
            if let Some(token) = &self.cancel {
                if token.is_cancelled() {
                    self.emit_warning(format!("download batch {batch} cancelled"));
                    return Err(Error::Cancelled);
                }
            }

            let mut task = DownloadTask::new(entry.clone(), index);
            if let Err(error) = self
                .process_entry(batch, &mut task, index, total, ignore_cache)
                .await
            {
                task.fail(error.to_string());
                self.tracker.update(DownloadUpdate::new(batch).failed());
                self.emit(AppEvent::Download(DownloadEvent::Failed {
                    batch,
                    full_name: entry.full_name.clone(),
                    error: error.to_string(),
                }));
                return Err(error);
            }
        }

        self.emit(AppEvent::Download(DownloadEvent::Completed {
            batch,
            entries: entries.clone(),
        }));
        Ok(entries)
    }

    async fn process_entry(
        &self,
        batch: usize,
        task: &mut DownloadTask,
        index: usize,
        total: usize,
        ignore_cache: bool,
    ) -> Result<(), Error> {
        let full_name = task.entry.full_name.clone();
        self.tracker
            .update(DownloadUpdate::new(batch).mod_name(full_name.clone()));

        if !ignore_cache && self.is_version_already_downloaded(&task.entry).await {
            task.set_status(DownloadStatus::Cached);
            self.emit_entry_progress(
                batch,
                &full_name,
                DownloadStatus::Cached,
                generate_progress_percentage(100.0, index, total),
            );
            return Ok(());
        }

        task.set_status(DownloadStatus::Downloading);
        let url = task.entry.download_url().to_string();
        let bytes = fetch_bytes_with_progress(&self.client, &url, |progress| {
            let entry_percent = progress.percent();
            self.tracker
                .update(DownloadUpdate::new(batch).download_progress(entry_percent));
            self.emit_entry_progress(
                batch,
                &full_name,
                DownloadStatus::Downloading,
                generate_progress_percentage(entry_percent, index, total),
            );
        })
        .await?;

        task.set_status(DownloadStatus::Saving);
        self.emit_entry_progress(
            batch,
            &full_name,
            DownloadStatus::Saving,
            generate_progress_percentage(100.0, index, total),
        );

        self.cache
            .write(&full_name, &task.entry.version.version_number, bytes)
            .await?;

        task.set_status(DownloadStatus::Done);
        self.tracker
            .update(DownloadUpdate::new(batch).install_progress(100.0));
        self.emit_entry_progress(
            batch,
            &full_name,
            DownloadStatus::Done,
            generate_progress_percentage(100.0, index, total),
        );
        Ok(())
    }

    fn emit_entry_progress(
        &self,
        batch: usize,
        full_name: &str,
        status: DownloadStatus,
        percent: f64,
    ) {
        self.emit(AppEvent::Download(DownloadEvent::Progress {
            batch,
            full_name: full_name.to_string(),
            status,
            percent,
        }));
    }
}

impl EventEmitter for Downloader {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}
