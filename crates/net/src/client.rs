//! HTTP client with connection pooling and retry logic

use modsync_errors::{Error, NetworkError};
use reqwest::{Client, Response};
use std::time::Duration;

/// Network client configuration
///
/// The retry budget applies to catalog fetches only; artifact downloads go
/// through [`NetClient::get_once`] and surface errors immediately.
#[derive(Debug, Clone)]
pub struct NetConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub retry_count: u32,
    pub retry_delay: Duration,
    pub user_agent: String,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(300), // 5 minutes for large downloads
            connect_timeout: Duration::from_secs(30),
            retry_count: 5,
            retry_delay: Duration::from_secs(2),
            user_agent: format!("modsync/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// HTTP client wrapper with retry logic
#[derive(Clone)]
pub struct NetClient {
    client: Client,
    config: NetConfig,
}

impl NetClient {
    /// Create a new network client
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client fails to
    /// initialize.
    pub fn new(config: NetConfig) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| NetworkError::ConnectionRefused(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Create with default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created with default
    /// settings.
    pub fn with_defaults() -> Result<Self, Error> {
        Self::new(NetConfig::default())
    }

    /// Execute a GET request, retrying up to the configured attempt budget
    /// with a fixed delay between attempts
    ///
    /// # Errors
    ///
    /// Returns `NetworkError::RetriesExhausted` once every attempt has
    /// failed with a retryable error, or the underlying error for
    /// non-retryable failures (client error statuses, bad URLs).
    pub async fn get(&self, url: &str) -> Result<Response, Error> {
        let attempts = self.config.retry_count.max(1);
        let mut last_error = String::new();

        for attempt in 0..attempts {
            if attempt > 0 {
                tokio::time::sleep(self.config.retry_delay).await;
            }

            match self.get_once(url).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    if !Self::is_retryable(&e) {
                        return Err(e);
                    }
                    last_error = e.to_string();
                }
            }
        }

        Err(NetworkError::RetriesExhausted {
            url: url.to_string(),
            attempts,
            message: last_error,
        }
        .into())
    }

    /// Execute a single GET request with no retries
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or any non-success status.
    pub async fn get_once(&self, url: &str) -> Result<Response, Error> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::HttpError {
                status: status.as_u16(),
                message: status.to_string(),
            }
            .into());
        }

        Ok(response)
    }

    /// Determine if an error should be retried
    ///
    /// Timeouts, connection failures and server errors are retryable;
    /// client errors are not.
    fn is_retryable(error: &Error) -> bool {
        match error {
            Error::Network(NetworkError::Timeout { .. })
            | Error::Network(NetworkError::ConnectionRefused(_))
            | Error::Network(NetworkError::DownloadFailed(_)) => true,
            Error::Network(NetworkError::HttpError { status, .. }) => *status >= 500,
            _ => false,
        }
    }

    /// Get the underlying reqwest client for advanced usage
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

fn map_reqwest_error(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        NetworkError::Timeout {
            url: e
                .url()
                .map(std::string::ToString::to_string)
                .unwrap_or_default(),
        }
        .into()
    } else if e.is_connect() {
        NetworkError::ConnectionRefused(e.to_string()).into()
    } else {
        NetworkError::DownloadFailed(e.to_string()).into()
    }
}
