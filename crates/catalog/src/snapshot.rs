//! Immutable point-in-time view of one community's catalog

use modsync_types::{PackageRecord, Version};
use std::collections::HashMap;
use std::sync::Arc;

/// An immutable mapping from full package name to [`PackageRecord`]
///
/// Handed to the resolver for the duration of one resolution; catalog
/// updates never mutate a snapshot, they produce a new one, so a resolver
/// mid-walk cannot observe a half-updated catalog.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    packages: Arc<HashMap<String, PackageRecord>>,
}

impl Snapshot {
    /// Build a snapshot from catalog records
    #[must_use]
    pub fn from_records(records: Vec<PackageRecord>) -> Self {
        let packages = records
            .into_iter()
            .map(|r| (r.full_name.clone(), r))
            .collect();
        Self {
            packages: Arc::new(packages),
        }
    }

    /// Look up a package by full name
    #[must_use]
    pub fn get(&self, full_name: &str) -> Option<&PackageRecord> {
        self.packages.get(full_name)
    }

    #[must_use]
    pub fn contains(&self, full_name: &str) -> bool {
        self.packages.contains_key(full_name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Iterate all records
    pub fn records(&self) -> impl Iterator<Item = &PackageRecord> {
        self.packages.values()
    }

    /// Whether the given version of a package is its latest listed version
    #[must_use]
    pub fn is_latest_version(&self, full_name: &str, version: &Version) -> bool {
        self.get(full_name)
            .is_none_or(|record| record.is_latest(version))
    }

    /// Derived deprecation map over the whole snapshot
    #[must_use]
    pub fn deprecated_map(&self) -> HashMap<String, bool> {
        self.packages
            .iter()
            .map(|(name, record)| (name.clone(), record.is_deprecated()))
            .collect()
    }

    /// Count of packages whose latest version is not deprecated
    #[must_use]
    pub fn undeprecated_count(&self) -> usize {
        self.packages.values().filter(|r| !r.is_deprecated()).count()
    }
}
