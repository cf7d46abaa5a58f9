#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Dependency resolution for modsync
//!
//! Given a requested package version and a catalog snapshot, produces a
//! flat, deduplicated, ordered list of (package, version) pairs to
//! install. The requested package is always the first element; transitive
//! dependencies follow in the order first discovered (depth-first,
//! dependencies of a package processed in their declared order before
//! moving to the next sibling).
//!
//! Deduplication is first-wins: if the same package is reached twice via
//! different paths, the first resolution reached keeps its version and
//! later encounters are no-ops. Declaration order therefore doubles as
//! priority order.

use modsync_catalog::Snapshot;
use modsync_errors::{Error, PackageError};
use modsync_types::{PackageVersion, ResolvedEntry, Version};
use std::collections::HashSet;

/// Resolve a package pinned to an exact version, honoring each declared
/// dependency's exact pinned version
///
/// Transitive dependencies missing from the snapshot are silently dropped:
/// the catalog currently lacks them and a missing optional dependency
/// should not block install of the primary package. A declared dependency
/// whose exact version is absent stops that branch without adding an
/// entry.
///
/// # Errors
///
/// Returns `PackageError::NotFound` if the requested package is absent
/// from the snapshot, or `PackageError::VersionNotFound` if the requested
/// version is not listed.
pub fn resolve_exact(
    full_name: &str,
    version: &Version,
    snapshot: &Snapshot,
) -> Result<Vec<ResolvedEntry>, Error> {
    let requested = lookup_requested(full_name, version, snapshot)?;

    let mut builder = Vec::new();
    let mut seen = HashSet::new();
    seen.insert(full_name.to_string());
    builder.push(ResolvedEntry::new(full_name, requested.clone()));

    walk(&requested, snapshot, Mode::Exact, &mut builder, &mut seen);
    Ok(builder)
}

/// Resolve a package pinned to an exact version, substituting each
/// dependency's current latest version for the pinned one
///
/// The walk recurses using each dependency's own latest-version dependency
/// list, not the list of the version that was pinned, so latest-mode
/// closures may diverge from exact-mode closures for the same package.
///
/// # Errors
///
/// Same as [`resolve_exact`] for the top-level requested package.
pub fn resolve_latest(
    full_name: &str,
    version: &Version,
    snapshot: &Snapshot,
) -> Result<Vec<ResolvedEntry>, Error> {
    let requested = lookup_requested(full_name, version, snapshot)?;

    let mut builder = Vec::new();
    let mut seen = HashSet::new();
    seen.insert(full_name.to_string());
    builder.push(ResolvedEntry::new(full_name, requested.clone()));

    walk(&requested, snapshot, Mode::Latest, &mut builder, &mut seen);
    Ok(builder)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Exact,
    Latest,
}

fn lookup_requested(
    full_name: &str,
    version: &Version,
    snapshot: &Snapshot,
) -> Result<PackageVersion, Error> {
    let record = snapshot
        .get(full_name)
        .ok_or_else(|| PackageError::NotFound {
            name: full_name.to_string(),
        })?;

    record
        .get_version(version)
        .cloned()
        .ok_or_else(|| {
            PackageError::VersionNotFound {
                name: full_name.to_string(),
                version: version.to_string(),
            }
            .into()
        })
}

fn walk(
    current: &PackageVersion,
    snapshot: &Snapshot,
    mode: Mode,
    builder: &mut Vec<ResolvedEntry>,
    seen: &mut HashSet<String>,
) {
    for dep in current.parsed_dependencies() {
        // First resolution reached wins; later paths never overwrite it.
        if seen.contains(&dep.full_name) {
            continue;
        }

        // Package missing from the snapshot entirely: silently dropped.
        let Some(record) = snapshot.get(&dep.full_name) else {
            continue;
        };

        let chosen = match mode {
            Mode::Exact => record.get_version(&dep.version),
            Mode::Latest => record.latest(),
        };
        // Version not found: this branch stops without adding an entry.
        let Some(chosen) = chosen else {
            continue;
        };

        seen.insert(dep.full_name.clone());
        builder.push(ResolvedEntry::new(&dep.full_name, chosen.clone()));
        walk(chosen, snapshot, mode, builder, seen);
    }
}
