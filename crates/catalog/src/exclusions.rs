//! Separately-maintained package exclusion list
//!
//! Packages whose full name appears on this list are dropped before the
//! catalog is persisted. The list is fetched at most once per process
//! lifetime unless explicitly invalidated.

use modsync_errors::{Error, NetworkError};
use modsync_net::NetClient;
use tokio::sync::Mutex;

/// Lazily-fetched, process-cached exclusion list
pub struct ExclusionList {
    client: NetClient,
    url: String,
    cached: Mutex<Option<Vec<String>>>,
}

impl ExclusionList {
    /// Create an exclusion list backed by the given URL
    pub fn new(client: NetClient, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            cached: Mutex::new(None),
        }
    }

    /// Get the excluded full names, fetching on first use
    ///
    /// The remote document is one full name per line; blank lines are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the list cannot be fetched after the retry
    /// budget is spent.
    pub async fn get(&self) -> Result<Vec<String>, Error> {
        let mut cached = self.cached.lock().await;
        if let Some(exclusions) = cached.as_ref() {
            return Ok(exclusions.clone());
        }

        let response = self.client.get(&self.url).await?;
        let body = response
            .text()
            .await
            .map_err(|e| NetworkError::DownloadFailed(e.to_string()))?;

        let exclusions: Vec<String> = body
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(ToString::to_string)
            .collect();

        *cached = Some(exclusions.clone());
        Ok(exclusions)
    }

    /// Drop the cached list so the next use refetches it
    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }
}
