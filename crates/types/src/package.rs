//! Package-related type definitions
//!
//! A package is identified catalog-wide by its full name
//! (`namespace-name`). Dependencies are declared as pinned strings of the
//! form `namespace-name-1.2.3`, i.e. a full name plus an exact version.

use semver::Version;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use modsync_errors::PackageError;

/// Unique identifier for one version of a package
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageId {
    pub full_name: String,
    pub version: Version,
}

impl PackageId {
    /// Create a new package ID
    pub fn new(full_name: impl Into<String>, version: Version) -> Self {
        Self {
            full_name: full_name.into(),
            version,
        }
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.full_name, self.version)
    }
}

/// A declared dependency: full name pinned to an exact version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub full_name: String,
    pub version: Version,
}

impl FromStr for Dependency {
    type Err = PackageError;

    /// Parse a dependency string of the form `namespace-name-1.2.3`.
    ///
    /// The version is always the final dash-separated segment; the full
    /// name may itself contain dashes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (full_name, version_str) =
            s.rsplit_once('-')
                .ok_or_else(|| PackageError::InvalidDependency {
                    input: s.to_string(),
                })?;

        if full_name.is_empty() || !full_name.contains('-') {
            return Err(PackageError::InvalidDependency {
                input: s.to_string(),
            });
        }

        let version =
            Version::parse(version_str).map_err(|_| PackageError::InvalidDependency {
                input: s.to_string(),
            })?;

        Ok(Self {
            full_name: full_name.to_string(),
            version,
        })
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.full_name, self.version)
    }
}

/// One released version of a package, as listed in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageVersion {
    pub version_number: Version,
    /// Declared dependencies as `namespace-name-1.2.3` strings, in
    /// declaration order. Declaration order is resolution priority order.
    #[serde(default)]
    pub dependencies: Vec<String>,
    pub download_url: String,
    #[serde(default)]
    pub file_size: u64,
    #[serde(default)]
    pub is_deprecated: bool,
}

impl PackageVersion {
    /// Parse the declared dependency strings, skipping malformed entries
    #[must_use]
    pub fn parsed_dependencies(&self) -> Vec<Dependency> {
        self.dependencies
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect()
    }
}

/// Catalog metadata for one package across all its versions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    pub full_name: String,
    pub versions: Vec<PackageVersion>,
}

impl PackageRecord {
    /// Create a record with the given versions
    pub fn new(full_name: impl Into<String>, versions: Vec<PackageVersion>) -> Self {
        Self {
            full_name: full_name.into(),
            versions,
        }
    }

    /// Latest version, defined as the highest semantic-version ordering
    #[must_use]
    pub fn latest(&self) -> Option<&PackageVersion> {
        self.versions.iter().max_by(|a, b| {
            a.version_number.cmp(&b.version_number)
        })
    }

    /// Find an exact version
    #[must_use]
    pub fn get_version(&self, version: &Version) -> Option<&PackageVersion> {
        self.versions.iter().find(|v| &v.version_number == version)
    }

    /// Whether the given version is the latest (or newer than anything
    /// currently listed)
    #[must_use]
    pub fn is_latest(&self, version: &Version) -> bool {
        self.latest()
            .is_none_or(|latest| version >= &latest.version_number)
    }

    /// Derived record-level deprecation: the latest version carries the flag
    #[must_use]
    pub fn is_deprecated(&self) -> bool {
        self.latest().is_some_and(|v| v.is_deprecated)
    }
}

/// A package pinned to one chosen version, as produced by the resolver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedEntry {
    pub full_name: String,
    pub version: PackageVersion,
}

impl ResolvedEntry {
    /// Create a resolved entry
    pub fn new(full_name: impl Into<String>, version: PackageVersion) -> Self {
        Self {
            full_name: full_name.into(),
            version,
        }
    }

    /// Identifier of the pinned (package, version) pair
    #[must_use]
    pub fn package_id(&self) -> PackageId {
        PackageId::new(self.full_name.clone(), self.version.version_number.clone())
    }

    /// Download URL of the pinned version
    #[must_use]
    pub fn download_url(&self) -> &str {
        &self.version.download_url
    }
}

impl fmt::Display for ResolvedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.full_name, self.version.version_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(num: &str, deps: &[&str]) -> PackageVersion {
        PackageVersion {
            version_number: Version::parse(num).unwrap(),
            dependencies: deps.iter().map(ToString::to_string).collect(),
            download_url: format!("https://cdn.example.com/{num}.zip"),
            file_size: 1024,
            is_deprecated: false,
        }
    }

    #[test]
    fn test_dependency_parsing() {
        let dep: Dependency = "BepInEx-BepInExPack-5.4.21".parse().unwrap();
        assert_eq!(dep.full_name, "BepInEx-BepInExPack");
        assert_eq!(dep.version, Version::new(5, 4, 21));

        // Version must be the final segment
        assert!("no_dashes".parse::<Dependency>().is_err());
        assert!("ns-name-not.a.version".parse::<Dependency>().is_err());
        // Full name needs both namespace and name
        assert!("name-1.0.0".parse::<Dependency>().is_err());
    }

    #[test]
    fn test_latest_version() {
        let record = PackageRecord::new(
            "ns-pkg",
            vec![version("1.0.0", &[]), version("2.1.0", &[]), version("2.0.3", &[])],
        );
        assert_eq!(
            record.latest().unwrap().version_number,
            Version::new(2, 1, 0)
        );
        assert!(record.is_latest(&Version::new(2, 1, 0)));
        assert!(!record.is_latest(&Version::new(2, 0, 3)));
    }

    #[test]
    fn test_get_version() {
        let record = PackageRecord::new("ns-pkg", vec![version("1.0.0", &[])]);
        assert!(record.get_version(&Version::new(1, 0, 0)).is_some());
        assert!(record.get_version(&Version::new(9, 9, 9)).is_none());
    }

    #[test]
    fn test_deprecation_follows_latest() {
        let mut old = version("1.0.0", &[]);
        old.is_deprecated = true;
        let record = PackageRecord::new("ns-pkg", vec![old, version("2.0.0", &[])]);
        assert!(!record.is_deprecated());
    }

    #[test]
    fn test_parsed_dependencies_skip_malformed() {
        let v = version("1.0.0", &["Team-ModA-1.0.0", "garbage"]);
        let deps = v.parsed_dependencies();
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].full_name, "Team-ModA");
    }
}
