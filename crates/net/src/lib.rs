#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Network operations for modsync
//!
//! This crate wraps the HTTP transport: catalog index and chunk fetches go
//! through the retrying client, artifact downloads use a single attempt and
//! stream their bytes with fractional progress reporting.

mod client;

pub use client::{NetClient, NetConfig};

use futures::StreamExt;
use modsync_errors::{Error, NetworkError};
use serde::de::DeserializeOwned;
use std::time::{SystemTime, UNIX_EPOCH};
use url::Url;

/// Byte-level progress of one in-flight download
#[derive(Debug, Clone, Copy)]
pub struct DownloadProgress {
    pub downloaded: u64,
    pub total: Option<u64>,
}

impl DownloadProgress {
    /// Percentage of the entry downloaded, 0-100. Unknown totals report 0
    /// until completion.
    #[must_use]
    pub fn percent(&self) -> f64 {
        match self.total {
            #[allow(clippy::cast_precision_loss)]
            Some(total) if total > 0 => (self.downloaded as f64 / total as f64) * 100.0,
            _ => 0.0,
        }
    }
}

/// Fetch a JSON document with retries
///
/// # Errors
///
/// Returns an error if the request fails after the retry budget is spent or
/// the body cannot be deserialized.
pub async fn fetch_json<T: DeserializeOwned>(client: &NetClient, url: &str) -> Result<T, Error> {
    let response = client.get(url).await?;
    response
        .json()
        .await
        .map_err(|e| NetworkError::DownloadFailed(format!("invalid JSON body: {e}")).into())
}

/// Fetch binary content with retries
///
/// # Errors
///
/// Returns an error if the request fails after the retry budget is spent.
pub async fn fetch_bytes(client: &NetClient, url: &str) -> Result<Vec<u8>, Error> {
    let response = client.get(url).await?;
    response
        .bytes()
        .await
        .map(|b| b.to_vec())
        .map_err(|e| NetworkError::DownloadFailed(e.to_string()).into())
}

/// Download an artifact in a single attempt, streaming the body and
/// reporting byte progress as it arrives
///
/// Download fetches are deliberately not retried; failures surface
/// immediately so the batch pipeline can halt.
///
/// # Errors
///
/// Returns an error on transport failure, non-success status, or a broken
/// body stream.
pub async fn fetch_bytes_with_progress<F>(
    client: &NetClient,
    url: &str,
    mut on_progress: F,
) -> Result<Vec<u8>, Error>
where
    F: FnMut(DownloadProgress),
{
    let response = client.get_once(url).await?;
    let total = response.content_length();

    let mut stream = response.bytes_stream();
    let mut body = Vec::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| NetworkError::DownloadFailed(e.to_string()))?;
        body.extend_from_slice(&chunk);
        on_progress(DownloadProgress {
            downloaded: body.len() as u64,
            total,
        });
    }

    Ok(body)
}

/// Parse and validate a URL
///
/// # Errors
///
/// Returns an error if the URL string is malformed.
pub fn parse_url(url: &str) -> Result<Url, Error> {
    Url::parse(url).map_err(|e| NetworkError::InvalidUrl(e.to_string()).into())
}

/// Append a cache-busting query parameter so stale CDN copies of the
/// catalog index are bypassed
///
/// # Errors
///
/// Returns an error if the URL string is malformed.
pub fn add_cache_busting_param(url: &str) -> Result<String, Error> {
    let mut parsed = parse_url(url)?;
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    parsed
        .query_pairs_mut()
        .append_pair("disableCache", &stamp.to_string());
    Ok(parsed.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url() {
        assert!(parse_url("https://example.com").is_ok());
        assert!(parse_url("not a url").is_err());
    }

    #[test]
    fn test_cache_busting_param() {
        let url = add_cache_busting_param("https://example.com/c/ror2/api/v1/package-index/")
            .unwrap();
        assert!(url.contains("disableCache="));
    }

    #[test]
    fn test_progress_percent() {
        let p = DownloadProgress {
            downloaded: 50,
            total: Some(200),
        };
        assert!((p.percent() - 25.0).abs() < f64::EPSILON);

        let unknown = DownloadProgress {
            downloaded: 50,
            total: None,
        };
        assert!((unknown.percent() - 0.0).abs() < f64::EPSILON);
    }
}
