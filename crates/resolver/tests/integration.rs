//! Integration tests for dependency resolution
//!
//! Exercises the fixed fixture graph from the tie-break contract:
//! A depends on B and C in that declared order, B pins D 1.0.0 and C pins
//! D 2.0.0. The D version chosen must be exactly the one reached first.

use modsync_catalog::Snapshot;
use modsync_resolver::{resolve_exact, resolve_latest};
use modsync_types::{PackageRecord, PackageVersion, Version};
use std::collections::HashSet;

fn version(num: &str, deps: &[&str]) -> PackageVersion {
    PackageVersion {
        version_number: Version::parse(num).unwrap(),
        dependencies: deps.iter().map(ToString::to_string).collect(),
        download_url: format!("https://cdn.example.com/{num}.zip"),
        file_size: 4096,
        is_deprecated: false,
    }
}

fn diamond_snapshot() -> Snapshot {
    Snapshot::from_records(vec![
        PackageRecord::new(
            "Team-A",
            vec![version("1.0.0", &["Team-B-1.0.0", "Team-C-1.0.0"])],
        ),
        PackageRecord::new("Team-B", vec![version("1.0.0", &["Team-D-1.0.0"])]),
        PackageRecord::new("Team-C", vec![version("1.0.0", &["Team-D-2.0.0"])]),
        PackageRecord::new(
            "Team-D",
            vec![version("1.0.0", &[]), version("2.0.0", &[])],
        ),
    ])
}

#[test]
fn test_first_wins_tie_break() {
    let resolved = resolve_exact("Team-A", &Version::new(1, 0, 0), &diamond_snapshot()).unwrap();

    // B is declared before C, so B's D requirement is reached first and
    // its version wins; C's later requirement is a no-op.
    let d = resolved
        .iter()
        .find(|e| e.full_name == "Team-D")
        .expect("D resolved");
    assert_eq!(d.version.version_number, Version::new(1, 0, 0));
}

#[test]
fn test_no_package_appears_twice() {
    let resolved = resolve_exact("Team-A", &Version::new(1, 0, 0), &diamond_snapshot()).unwrap();

    let mut names = HashSet::new();
    for entry in &resolved {
        assert!(
            names.insert(entry.full_name.clone()),
            "{} appears twice",
            entry.full_name
        );
    }
    assert_eq!(resolved.len(), 4);
}

#[test]
fn test_depth_first_discovery_order() {
    let resolved = resolve_exact("Team-A", &Version::new(1, 0, 0), &diamond_snapshot()).unwrap();

    let names: Vec<&str> = resolved.iter().map(|e| e.full_name.as_str()).collect();
    // B's subtree (including D) is fully discovered before sibling C
    assert_eq!(names, vec!["Team-A", "Team-B", "Team-D", "Team-C"]);
}

#[test]
fn test_declared_order_controls_priority() {
    // Same graph but A declares C before B: C's D pin must now win.
    let snap = Snapshot::from_records(vec![
        PackageRecord::new(
            "Team-A",
            vec![version("1.0.0", &["Team-C-1.0.0", "Team-B-1.0.0"])],
        ),
        PackageRecord::new("Team-B", vec![version("1.0.0", &["Team-D-1.0.0"])]),
        PackageRecord::new("Team-C", vec![version("1.0.0", &["Team-D-2.0.0"])]),
        PackageRecord::new(
            "Team-D",
            vec![version("1.0.0", &[]), version("2.0.0", &[])],
        ),
    ]);

    let resolved = resolve_exact("Team-A", &Version::new(1, 0, 0), &snap).unwrap();
    let d = resolved.iter().find(|e| e.full_name == "Team-D").unwrap();
    assert_eq!(d.version.version_number, Version::new(2, 0, 0));
}

#[test]
fn test_cyclic_declarations_terminate() {
    let snap = Snapshot::from_records(vec![
        PackageRecord::new("Team-A", vec![version("1.0.0", &["Team-B-1.0.0"])]),
        PackageRecord::new("Team-B", vec![version("1.0.0", &["Team-A-1.0.0"])]),
    ]);

    let resolved = resolve_exact("Team-A", &Version::new(1, 0, 0), &snap).unwrap();
    assert_eq!(resolved.len(), 2);
}

#[test]
fn test_latest_mode_first_wins_still_applies() {
    let resolved = resolve_latest("Team-A", &Version::new(1, 0, 0), &diamond_snapshot()).unwrap();

    // Latest mode substitutes D 2.0.0 at B's step already, and C's
    // encounter remains a no-op.
    let d = resolved.iter().find(|e| e.full_name == "Team-D").unwrap();
    assert_eq!(d.version.version_number, Version::new(2, 0, 0));
    assert_eq!(resolved.len(), 4);
}
