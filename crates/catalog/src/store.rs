//! Persistent catalog storage
//!
//! The store is keyed by community. Package content is replaced wholesale
//! on each successful synchronization; the index hash and last-update
//! timestamp live in a sidecar meta file. All writes go through a
//! temporary file plus atomic rename so a crashed write never leaves a
//! half-updated catalog behind.

use crate::snapshot::Snapshot;
use chrono::{DateTime, Utc};
use modsync_errors::{CatalogError, Error};
use modsync_types::PackageRecord;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Persistent, keyed storage of package metadata
///
/// One implementation per backing store, injected into the synchronizer.
#[allow(async_fn_in_trait)]
pub trait CatalogStore {
    /// When the community's catalog was last synchronized, if ever
    async fn last_update_time(&self, community: &str) -> Result<Option<DateTime<Utc>>, Error>;

    /// Whether the stored index hash equals `hash`
    async fn is_latest_index(&self, community: &str, hash: &str) -> Result<bool, Error>;

    /// Persist a new index hash and bump the last-update timestamp
    async fn set_latest_index(&self, community: &str, hash: &str) -> Result<(), Error>;

    /// Replace the community's catalog content wholesale
    async fn replace_packages(
        &self,
        community: &str,
        records: Vec<PackageRecord>,
    ) -> Result<(), Error>;

    /// All stored records for the community
    async fn records(&self, community: &str) -> Result<Vec<PackageRecord>, Error>;

    /// Assemble the stored records into an immutable snapshot
    async fn snapshot(&self, community: &str) -> Result<Snapshot, Error> {
        Ok(Snapshot::from_records(self.records(community).await?))
    }

    /// Whether a catalog has ever been synchronized for the community
    async fn has_catalog(&self, community: &str) -> Result<bool, Error> {
        Ok(self.last_update_time(community).await?.is_some())
    }
}

/// File-backed catalog store: one directory per community holding
/// `packages.json` and an `index.meta` sidecar (hash + timestamp)
#[derive(Debug, Clone)]
pub struct FileCatalogStore {
    root: PathBuf,
}

impl FileCatalogStore {
    /// Create a store rooted at the given directory
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn community_dir(&self, community: &str) -> PathBuf {
        self.root.join(community)
    }

    fn packages_path(&self, community: &str) -> PathBuf {
        self.community_dir(community).join("packages.json")
    }

    fn meta_path(&self, community: &str) -> PathBuf {
        self.community_dir(community).join("index.meta")
    }

    async fn read_meta(&self, community: &str) -> Result<Option<(String, DateTime<Utc>)>, Error> {
        let path = self.meta_path(community);
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(_) => return Ok(None),
        };

        let mut lines = content.lines();
        let hash = lines.next().unwrap_or_default().to_string();
        let updated = lines
            .next()
            .and_then(|line| DateTime::parse_from_rfc3339(line).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| CatalogError::StoreError {
                message: format!("corrupt meta file: {}", path.display()),
            })?;

        Ok(Some((hash, updated)))
    }

    async fn write_atomic(&self, path: &Path, content: &[u8]) -> Result<(), Error> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| store_error("create community dir", &e))?;
        }

        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, content)
            .await
            .map_err(|e| store_error("write catalog file", &e))?;
        fs::rename(&temp_path, path)
            .await
            .map_err(|e| store_error("rename catalog file", &e))?;

        Ok(())
    }
}

fn store_error(action: &str, err: &std::io::Error) -> Error {
    CatalogError::StoreError {
        message: format!("failed to {action}: {err}"),
    }
    .into()
}

impl CatalogStore for FileCatalogStore {
    async fn last_update_time(&self, community: &str) -> Result<Option<DateTime<Utc>>, Error> {
        Ok(self.read_meta(community).await?.map(|(_, updated)| updated))
    }

    async fn is_latest_index(&self, community: &str, hash: &str) -> Result<bool, Error> {
        Ok(self
            .read_meta(community)
            .await?
            .is_some_and(|(stored, _)| stored == hash))
    }

    async fn set_latest_index(&self, community: &str, hash: &str) -> Result<(), Error> {
        let meta = format!("{hash}\n{}\n", Utc::now().to_rfc3339());
        self.write_atomic(&self.meta_path(community), meta.as_bytes())
            .await
    }

    async fn replace_packages(
        &self,
        community: &str,
        records: Vec<PackageRecord>,
    ) -> Result<(), Error> {
        let json = serde_json::to_vec(&records)?;
        self.write_atomic(&self.packages_path(community), &json)
            .await
    }

    async fn records(&self, community: &str) -> Result<Vec<PackageRecord>, Error> {
        let path = self.packages_path(community);
        let content = match fs::read(&path).await {
            Ok(content) => content,
            Err(_) => return Ok(Vec::new()),
        };

        serde_json::from_slice(&content).map_err(|e| {
            CatalogError::StoreError {
                message: format!("corrupt package file {}: {e}", path.display()),
            }
            .into()
        })
    }
}
