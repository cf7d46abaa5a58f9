#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Community catalog mirroring for modsync
//!
//! This crate keeps a local mirror of a remote package catalog up to date.
//! The remote catalog is published as an index document naming a content
//! hash and a set of chunk URLs; synchronization fetches the chunks only
//! when the hash has changed and replaces the stored catalog wholesale, so
//! concurrent readers always see either the old or the new complete
//! snapshot, never a partial one.

mod exclusions;
mod models;
mod snapshot;
mod store;
mod sync;

pub use exclusions::ExclusionList;
pub use models::{ChunkResponse, IndexContent, PackageListIndex};
pub use snapshot::Snapshot;
pub use store::{CatalogStore, FileCatalogStore};
pub use sync::Synchronizer;
