#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for modsync
//!
//! This crate handles loading configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/modsync/config.toml)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use modsync_errors::Error;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub paths: PathConfig,
}

/// Catalog endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Chunked package index endpoint; `{community}` is substituted per
    /// community
    #[serde(default = "default_index_url_template")]
    pub index_url_template: String,

    /// Remote exclusion list, one full name per line
    #[serde(default = "default_exclusions_url")]
    pub exclusions_url: String,
}

/// Network configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_timeout")]
    pub timeout: u64, // seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64, // seconds
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_retry_delay")]
    pub retry_delay: u64, // seconds
}

/// Content cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache root; falls back to the platform cache directory when unset
    pub root: Option<PathBuf>,

    /// When false, every download is re-fetched even if the exact version
    /// already sits in the cache
    #[serde(default = "default_honor_cache")]
    pub honor_cache: bool,
}

/// Path configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PathConfig {
    /// Persisted catalog root; falls back to the platform data directory
    /// when unset
    pub catalog_root: Option<PathBuf>,
}

impl PathConfig {
    /// Effective catalog root
    ///
    /// # Errors
    ///
    /// Returns an error if no root is configured and the platform data
    /// directory cannot be determined.
    pub fn effective_catalog_root(&self) -> Result<PathBuf, Error> {
        if let Some(root) = &self.catalog_root {
            return Ok(root.clone());
        }
        dirs::data_dir()
            .map(|dir| dir.join("modsync").join("catalog"))
            .ok_or_else(|| Error::config("data directory cannot be determined"))
    }
}

impl CatalogConfig {
    /// Index URL for one community
    #[must_use]
    pub fn index_url(&self, community: &str) -> String {
        self.index_url_template.replace("{community}", community)
    }
}

impl CacheConfig {
    /// Effective cache root
    ///
    /// # Errors
    ///
    /// Returns an error if no root is configured and the platform cache
    /// directory cannot be determined.
    pub fn effective_root(&self) -> Result<PathBuf, Error> {
        if let Some(root) = &self.root {
            return Ok(root.clone());
        }
        dirs::cache_dir()
            .map(|dir| dir.join("modsync").join("mods"))
            .ok_or_else(|| Error::config("cache directory cannot be determined"))
    }
}

// Default implementations

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            index_url_template: default_index_url_template(),
            exclusions_url: default_exclusions_url(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout: 300, // 5 minutes for large downloads
            connect_timeout: 30,
            retries: 5,
            retry_delay: 2, // seconds
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            root: None,
            honor_cache: true,
        }
    }
}

// Default value functions for serde

fn default_index_url_template() -> String {
    "https://thunderstore.io/c/{community}/api/v1/package-index/".to_string()
}

fn default_exclusions_url() -> String {
    "https://raw.githubusercontent.com/ebkr/r2modmanPlus/master/modExclusions.md".to_string()
}

fn default_timeout() -> u64 {
    300
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_retries() -> u32 {
    5
}

fn default_retry_delay() -> u64 {
    2
}

fn default_honor_cache() -> bool {
    true
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| Error::config("config directory not found"))?;
        Ok(config_dir.join("modsync").join("config.toml"))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| Error::config(format!("config file not found: {}", path.display())))?;

        toml::from_str(&contents).map_err(|e| Error::config(e.to_string()))
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed.
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.network.retries, 5);
        assert_eq!(config.network.retry_delay, 2);
        assert!(config.cache.honor_cache);
        assert!(config.catalog.index_url_template.contains("{community}"));
    }

    #[test]
    fn test_index_url_substitution() {
        let config = CatalogConfig::default();
        let url = config.index_url("riskofrain2");
        assert!(url.contains("/c/riskofrain2/"));
        assert!(!url.contains("{community}"));
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [network]
            retries = 2
            "#,
        )
        .unwrap();
        assert_eq!(config.network.retries, 2);
        // Unspecified fields keep their defaults.
        assert_eq!(config.network.timeout, 300);
        assert!(config.cache.honor_cache);
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [cache]
            root = "/tmp/modsync-test-cache"
            honor_cache = false
            "#
        )
        .unwrap();

        let config = Config::load_from_file(file.path()).await.unwrap();
        assert!(!config.cache.honor_cache);
        assert_eq!(
            config.cache.effective_root().unwrap(),
            PathBuf::from("/tmp/modsync-test-cache")
        );
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let err = Config::load_from_file(Path::new("/nonexistent/config.toml"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn test_invalid_toml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not valid toml [[[").unwrap();
        assert!(Config::load_from_file(file.path()).await.is_err());
    }
}
