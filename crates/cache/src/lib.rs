#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Local content cache for downloaded mod artifacts
//!
//! Entries are addressed by (package full name, exact version string).
//! Persisting an entry extracts the zip artifact into a staging directory
//! and renames it into its cache-addressed location, so a crashed write
//! never leaves a partially extracted entry behind and concurrent writers
//! of the same entry remain idempotent (both carry identical bytes from
//! the same immutable remote artifact).

use modsync_errors::{CacheError, Error};
use modsync_types::Version;
use std::io::{self, Cursor};
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use zip::ZipArchive;

/// Content cache rooted at a single directory, one subdirectory per
/// (full name, version) pair
#[derive(Debug, Clone)]
pub struct ModCache {
    root: PathBuf,
}

impl ModCache {
    /// Create a cache rooted at the given directory
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Cache-addressed location of one entry
    #[must_use]
    pub fn entry_path(&self, full_name: &str, version: &Version) -> PathBuf {
        self.root.join(full_name).join(version.to_string())
    }

    /// Check whether the entry is already cached
    ///
    /// Must be consulted before any network activity for the entry.
    pub async fn exists(&self, full_name: &str, version: &Version) -> bool {
        fs::metadata(self.entry_path(full_name, version))
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }

    /// Persist a downloaded artifact: extract the zip into the entry's
    /// cache-addressed directory
    ///
    /// # Errors
    ///
    /// Returns `CacheError::InvalidArchive` if the bytes are not a
    /// readable zip, or `CacheError::WriteFailed` on disk errors. Either
    /// failure leaves no partial entry in the cache.
    pub async fn write(
        &self,
        full_name: &str,
        version: &Version,
        bytes: Vec<u8>,
    ) -> Result<(), Error> {
        let final_path = self.entry_path(full_name, version);
        let parent = final_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.clone());

        fs::create_dir_all(&parent)
            .await
            .map_err(|e| write_failed(full_name, version, &e.to_string()))?;

        // Extract into a staging directory next to the final location so
        // the rename below stays on one filesystem.
        let staging = tempfile::tempdir_in(&parent)
            .map_err(|e| write_failed(full_name, version, &e.to_string()))?;

        let staging_path = staging.path().to_path_buf();
        let name = full_name.to_string();
        let ver = version.clone();
        tokio::task::spawn_blocking(move || extract_archive(&bytes, &staging_path, &name, &ver))
            .await
            .map_err(|e| write_failed(full_name, version, &e.to_string()))??;

        // Clear a previously cached copy; a concurrent writer may have
        // removed it already.
        if let Err(e) = fs::remove_dir_all(&final_path).await {
            if e.kind() != io::ErrorKind::NotFound {
                return Err(write_failed(full_name, version, &e.to_string()));
            }
        }
        if let Err(rename_err) = fs::rename(staging.path(), &final_path).await {
            // A concurrent writer of the same entry renamed first. The
            // remote artifact is immutable, so its copy is as good as
            // ours; drop the staging directory and report success.
            if fs::metadata(&final_path).await.is_ok() {
                return Ok(());
            }
            return Err(write_failed(full_name, version, &rename_err.to_string()));
        }
        let _ = staging.keep();

        Ok(())
    }
}

fn write_failed(full_name: &str, version: &Version, message: &str) -> Error {
    CacheError::WriteFailed {
        name: full_name.to_string(),
        version: version.to_string(),
        message: message.to_string(),
    }
    .into()
}

fn invalid_archive(full_name: &str, version: &Version, message: &str) -> Error {
    CacheError::InvalidArchive {
        name: full_name.to_string(),
        version: version.to_string(),
        message: message.to_string(),
    }
    .into()
}

/// Entry names must stay inside the extraction root
fn is_safe_relative_path(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

fn extract_archive(
    bytes: &[u8],
    dest: &Path,
    full_name: &str,
    version: &Version,
) -> Result<(), Error> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| invalid_archive(full_name, version, &e.to_string()))?;

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| invalid_archive(full_name, version, &e.to_string()))?;

        let name = entry.name().replace('\\', "/");
        if name.is_empty() {
            continue;
        }
        let entry_path = Path::new(&name);
        if !is_safe_relative_path(entry_path) {
            continue;
        }

        let out_path = dest.join(entry_path);
        if entry.is_dir() {
            std::fs::create_dir_all(&out_path)
                .map_err(|e| write_failed(full_name, version, &e.to_string()))?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| write_failed(full_name, version, &e.to_string()))?;
        }
        let mut outfile = std::fs::File::create(&out_path)
            .map_err(|e| write_failed(full_name, version, &e.to_string()))?;
        io::copy(&mut entry, &mut outfile)
            .map_err(|e| write_failed(full_name, version, &e.to_string()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;
    use zip::write::SimpleFileOptions;

    fn make_zip(files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in files {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(content).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[tokio::test]
    async fn test_write_extracts_and_exists() {
        let temp = tempdir().unwrap();
        let cache = ModCache::new(temp.path());
        let version = Version::new(1, 2, 3);

        assert!(!cache.exists("Team-Mod", &version).await);

        let archive = make_zip(&[
            ("manifest.json", br#"{"name": "Mod"}"#),
            ("plugins/Mod.dll", b"binary"),
        ]);
        cache.write("Team-Mod", &version, archive).await.unwrap();

        assert!(cache.exists("Team-Mod", &version).await);
        let manifest = cache
            .entry_path("Team-Mod", &version)
            .join("manifest.json");
        let content = tokio::fs::read_to_string(manifest).await.unwrap();
        assert!(content.contains("Mod"));
    }

    #[tokio::test]
    async fn test_versions_are_separate_entries() {
        let temp = tempdir().unwrap();
        let cache = ModCache::new(temp.path());

        let archive = make_zip(&[("readme.md", b"hello")]);
        cache
            .write("Team-Mod", &Version::new(1, 0, 0), archive)
            .await
            .unwrap();

        assert!(cache.exists("Team-Mod", &Version::new(1, 0, 0)).await);
        assert!(!cache.exists("Team-Mod", &Version::new(2, 0, 0)).await);
    }

    #[tokio::test]
    async fn test_invalid_archive_leaves_no_entry() {
        let temp = tempdir().unwrap();
        let cache = ModCache::new(temp.path());
        let version = Version::new(1, 0, 0);

        let err = cache
            .write("Team-Mod", &version, b"not a zip".to_vec())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            modsync_errors::Error::Cache(CacheError::InvalidArchive { .. })
        ));
        assert!(!cache.exists("Team-Mod", &version).await);
    }

    #[tokio::test]
    async fn test_rewrite_is_idempotent() {
        let temp = tempdir().unwrap();
        let cache = ModCache::new(temp.path());
        let version = Version::new(1, 0, 0);

        let archive = make_zip(&[("readme.md", b"hello")]);
        cache
            .write("Team-Mod", &version, archive.clone())
            .await
            .unwrap();
        cache.write("Team-Mod", &version, archive).await.unwrap();

        assert!(cache.exists("Team-Mod", &version).await);
    }

    #[tokio::test]
    async fn test_concurrent_writers_of_same_entry_both_succeed() {
        let temp = tempdir().unwrap();
        let cache = ModCache::new(temp.path());
        let version = Version::new(1, 0, 0);
        let archive = make_zip(&[("readme.md", b"hello")]);

        for round in 0..50 {
            let name = format!("Team-Mod{round}");
            let (a, b) = tokio::join!(
                cache.write(&name, &version, archive.clone()),
                cache.write(&name, &version, archive.clone())
            );
            a.unwrap();
            b.unwrap();
            assert!(cache.exists(&name, &version).await);

            // The loser's staging directory must not linger next to the
            // entry.
            let mut dir = tokio::fs::read_dir(temp.path().join(&name)).await.unwrap();
            let mut children = 0;
            while dir.next_entry().await.unwrap().is_some() {
                children += 1;
            }
            assert_eq!(children, 1);
        }
    }

    #[tokio::test]
    async fn test_traversal_entries_are_skipped() {
        let temp = tempdir().unwrap();
        let cache = ModCache::new(temp.path());
        let version = Version::new(1, 0, 0);

        let archive = make_zip(&[("../escape.txt", b"nope"), ("safe.txt", b"ok")]);
        cache.write("Team-Mod", &version, archive).await.unwrap();

        assert!(!temp.path().join("escape.txt").exists());
        assert!(cache
            .entry_path("Team-Mod", &version)
            .join("safe.txt")
            .exists());
    }
}
