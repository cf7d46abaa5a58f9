//! Command line interface definition

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// modsync - catalog synchronization and mod download manager
#[derive(Parser)]
#[command(name = "modsync")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Catalog synchronization and mod download manager")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Synchronize the package catalog for a community
    Sync {
        /// Community identifier, e.g. riskofrain2
        community: String,
    },

    /// Download a package and its dependencies into the cache
    #[command(alias = "i")]
    Install {
        /// Community identifier
        community: String,

        /// Package full name (namespace-name)
        package: String,

        /// Exact version; latest when omitted
        version: Option<String>,

        /// Re-download even when the version is already cached
        #[arg(long)]
        ignore_cache: bool,
    },

    /// Download the latest version of the named packages plus dependencies
    #[command(alias = "up")]
    Update {
        /// Community identifier
        community: String,

        /// Package full names
        packages: Vec<String>,

        /// Re-download even when versions are already cached
        #[arg(long)]
        ignore_cache: bool,
    },

    /// Download an exported exact-version list
    Import {
        /// Community identifier
        community: String,

        /// File with one namespace-name-1.2.3 line per entry
        file: PathBuf,

        /// Re-download even when versions are already cached
        #[arg(long)]
        ignore_cache: bool,
    },

    /// List the stored catalog for a community
    #[command(alias = "ls")]
    List {
        /// Community identifier
        community: String,

        /// Only show packages whose full name contains this string
        #[arg(long)]
        filter: Option<String>,
    },
}
