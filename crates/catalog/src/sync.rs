//! Catalog synchronizer
//!
//! Fetches the remote index for a community and, only when its content
//! hash differs from the stored one, downloads every chunk, filters
//! excluded packages and replaces the stored catalog. A failure at any
//! step before the final persist leaves the previous catalog and hash
//! untouched.

use crate::exclusions::ExclusionList;
use crate::models::{ChunkResponse, IndexContent, PackageListIndex};
use crate::store::CatalogStore;
use modsync_errors::{CatalogError, Error};
use modsync_events::{AppEvent, EventEmitter, EventSender, SyncEvent};
use modsync_net::{add_cache_busting_param, fetch_bytes, NetClient};
use modsync_types::PackageRecord;

/// Synchronizes one community's local catalog mirror with the remote API
pub struct Synchronizer<S> {
    client: NetClient,
    store: S,
    exclusions: ExclusionList,
    tx: Option<EventSender>,
}

impl<S: CatalogStore> Synchronizer<S> {
    /// Create a synchronizer over the given store and exclusion list
    pub fn new(client: NetClient, store: S, exclusions: ExclusionList) -> Self {
        Self {
            client,
            store,
            exclusions,
            tx: None,
        }
    }

    /// Attach an event sender for progress reporting
    #[must_use]
    pub fn with_events(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    /// Access the underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Synchronize the community's catalog from the given index URL
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::FetchFailed` if the index or a chunk cannot
    /// be retrieved after the retry budget is spent, or a format error if
    /// the index or any chunk is structurally invalid. Either way the
    /// previously stored catalog and hash are left untouched.
    pub async fn synchronize(&self, community: &str, index_url: &str) -> Result<(), Error> {
        self.tx.emit(AppEvent::Sync(SyncEvent::Started {
            community: community.to_string(),
        }));

        match self.run(community, index_url).await {
            Ok(()) => Ok(()),
            Err(error) => {
                self.tx.emit(AppEvent::Sync(SyncEvent::Failed {
                    community: community.to_string(),
                    error: error.to_string(),
                }));
                Err(error)
            }
        }
    }

    async fn run(&self, community: &str, index_url: &str) -> Result<(), Error> {
        let index = self.fetch_index(community, index_url).await?;

        // An empty index is never valid: every community catalog has at
        // least one package.
        if index.content.is_empty() {
            return Err(CatalogError::EmptyIndex.into());
        }

        // Unchanged hash means the stored content is identical to what a
        // refetch would produce; only the timestamp moves.
        if self.store.is_latest_index(community, &index.hash).await? {
            self.store.set_latest_index(community, &index.hash).await?;
            self.tx.emit(AppEvent::Sync(SyncEvent::UpToDate {
                community: community.to_string(),
            }));
            return Ok(());
        }

        let chunks = match &index.content {
            IndexContent::Packages(records) => {
                self.emit_progress(community, 1, 1);
                vec![records.clone()]
            }
            IndexContent::ChunkUrls(urls) => self.fetch_chunks(community, urls).await?,
        };

        let exclusions = self.exclusions.get().await?;
        let filtered: Vec<PackageRecord> = chunks
            .into_iter()
            .flatten()
            .filter(|record| !exclusions.contains(&record.full_name))
            .collect();

        let package_count = filtered.len();
        self.store.replace_packages(community, filtered).await?;
        self.store.set_latest_index(community, &index.hash).await?;

        self.tx.emit(AppEvent::Sync(SyncEvent::Completed {
            community: community.to_string(),
            package_count,
        }));
        Ok(())
    }

    async fn fetch_index(
        &self,
        community: &str,
        index_url: &str,
    ) -> Result<PackageListIndex, Error> {
        let busted = add_cache_busting_param(index_url)?;
        let bytes = fetch_bytes(&self.client, &busted).await.map_err(|e| {
            CatalogError::FetchFailed {
                community: community.to_string(),
                message: e.to_string(),
            }
        })?;

        serde_json::from_slice(&bytes).map_err(|e| {
            CatalogError::InvalidIndex {
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Fetch chunks serially, not in parallel: concurrent fetches compete
    /// for bandwidth on slow connections and increase timeout risk.
    async fn fetch_chunks(
        &self,
        community: &str,
        urls: &[String],
    ) -> Result<Vec<Vec<PackageRecord>>, Error> {
        // The index fetch counts as one completed unit of work.
        let total = urls.len() + 1;
        let mut completed = 1;
        self.emit_progress(community, completed, total);

        let mut chunks = Vec::with_capacity(urls.len());
        for (i, url) in urls.iter().enumerate() {
            let bytes =
                fetch_bytes(&self.client, url)
                    .await
                    .map_err(|e| CatalogError::FetchFailed {
                        community: community.to_string(),
                        message: e.to_string(),
                    })?;

            let chunk: ChunkResponse =
                serde_json::from_slice(&bytes).map_err(|e| CatalogError::InvalidChunk {
                    index: i,
                    message: e.to_string(),
                })?;

            // An empty chunk inside a multi-chunk response signals
            // server-side corruption.
            if urls.len() > 1 && chunk.content.is_empty() {
                return Err(CatalogError::EmptyChunk { index: i }.into());
            }

            chunks.push(chunk.content);
            completed += 1;
            self.emit_progress(community, completed, total);
        }

        Ok(chunks)
    }

    #[allow(clippy::cast_precision_loss)]
    fn emit_progress(&self, community: &str, completed: usize, total: usize) {
        self.tx.emit(AppEvent::Sync(SyncEvent::Progress {
            community: community.to_string(),
            completed,
            total,
            percent: (completed as f64 / total as f64) * 100.0,
        }));
    }
}
