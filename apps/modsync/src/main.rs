//! modsync - catalog synchronization and mod download manager
//!
//! The CLI wires the engine crates together: a file-backed catalog store,
//! the retrying network client, the content cache and the sequential
//! downloader, all reporting through one event channel.

mod cli;
mod error;
mod events;

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::events::EventHandler;
use clap::Parser;
use modsync_cache::ModCache;
use modsync_catalog::{CatalogStore, ExclusionList, FileCatalogStore, Snapshot, Synchronizer};
use modsync_config::Config;
use modsync_download::Downloader;
use modsync_errors::PackageError;
use modsync_events::{EventReceiver, EventSender};
use modsync_net::{NetClient, NetConfig};
use modsync_types::{Dependency, Version};
use std::process;
use std::time::Duration;
use tokio::select;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.global.debug);

    if let Err(e) = run(cli).await {
        error!("application error: {e}");
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Main application logic
async fn run(cli: Cli) -> Result<(), CliError> {
    info!("starting modsync v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load_or_default(cli.global.config.as_deref()).await?;
    let client = NetClient::new(net_config(&config))?;
    let store = FileCatalogStore::new(config.paths.effective_catalog_root()?);
    let cache = ModCache::new(config.cache.effective_root()?);

    let (event_sender, event_receiver) = modsync_events::channel();
    let mut event_handler = EventHandler::new(cli.global.debug);

    execute_command_with_events(
        cli.command,
        config,
        client,
        store,
        cache,
        event_sender,
        event_receiver,
        &mut event_handler,
    )
    .await?;

    info!("command completed successfully");
    Ok(())
}

/// Execute command with concurrent event handling
#[allow(clippy::too_many_arguments)]
async fn execute_command_with_events(
    command: Commands,
    config: Config,
    client: NetClient,
    store: FileCatalogStore,
    cache: ModCache,
    event_sender: EventSender,
    mut event_receiver: EventReceiver,
    event_handler: &mut EventHandler,
) -> Result<(), CliError> {
    let mut command_future = Box::pin(execute_command(
        command,
        config,
        client,
        store,
        cache,
        event_sender,
    ));

    // Handle events concurrently with command execution
    loop {
        select! {
            // Command completed
            result = &mut command_future => {
                // Drain any remaining events
                while let Ok(event) = event_receiver.try_recv() {
                    event_handler.handle_event(event);
                }
                return result;
            }

            // Event received
            event = event_receiver.recv() => {
                match event {
                    Some(event) => event_handler.handle_event(event),
                    None => { /* Channel closed: keep waiting for command to finish */ }
                }
            }
        }
    }
}

/// Execute the specified command
async fn execute_command(
    command: Commands,
    config: Config,
    client: NetClient,
    store: FileCatalogStore,
    cache: ModCache,
    event_sender: EventSender,
) -> Result<(), CliError> {
    match command {
        Commands::Sync { community } => {
            synchronize(&config, client, store, event_sender, &community).await?;
            Ok(())
        }

        Commands::Install {
            community,
            package,
            version,
            ignore_cache,
        } => {
            let snapshot =
                ensure_snapshot(&config, &client, &store, &event_sender, &community).await?;

            let version = match version {
                Some(raw) => Version::parse(&raw).map_err(|e| {
                    CliError::InvalidArguments(format!("invalid version '{raw}': {e}"))
                })?,
                None => latest_version_of(&snapshot, &package)?,
            };

            let downloader = Downloader::new(client, cache).with_events(event_sender);
            downloader
                .download(
                    &package,
                    &version,
                    &snapshot,
                    effective_ignore_cache(&config, ignore_cache),
                )
                .await?;
            Ok(())
        }

        Commands::Update {
            community,
            packages,
            ignore_cache,
        } => {
            if packages.is_empty() {
                return Err(CliError::InvalidArguments(
                    "at least one package name is required".to_string(),
                ));
            }

            let snapshot =
                ensure_snapshot(&config, &client, &store, &event_sender, &community).await?;

            let downloader = Downloader::new(client, cache).with_events(event_sender);
            downloader
                .download_latest_of_all(
                    &packages,
                    &snapshot,
                    effective_ignore_cache(&config, ignore_cache),
                )
                .await?;
            Ok(())
        }

        Commands::Import {
            community,
            file,
            ignore_cache,
        } => {
            let imports = read_import_file(&file).await?;
            let snapshot =
                ensure_snapshot(&config, &client, &store, &event_sender, &community).await?;

            let downloader = Downloader::new(client, cache).with_events(event_sender);
            downloader
                .download_imported(
                    &imports,
                    &snapshot,
                    effective_ignore_cache(&config, ignore_cache),
                )
                .await?;
            Ok(())
        }

        Commands::List { community, filter } => {
            let snapshot = store.snapshot(&community).await?;
            if snapshot.is_empty() {
                println!("No catalog stored for {community}; run `modsync sync {community}`");
                return Ok(());
            }

            let mut records: Vec<_> = snapshot
                .records()
                .filter(|r| {
                    filter
                        .as_deref()
                        .is_none_or(|needle| r.full_name.contains(needle))
                })
                .collect();
            records.sort_unstable_by(|a, b| a.full_name.cmp(&b.full_name));

            for record in &records {
                let name = &record.full_name;
                match record.latest() {
                    Some(latest) if latest.is_deprecated => {
                        println!("{name} {} [deprecated]", latest.version_number);
                    }
                    Some(latest) => println!("{name} {}", latest.version_number),
                    None => println!("{name} (no versions)"),
                }
            }
            println!("{} packages", records.len());
            Ok(())
        }
    }
}

/// Run one catalog synchronization for a community
async fn synchronize(
    config: &Config,
    client: NetClient,
    store: FileCatalogStore,
    event_sender: EventSender,
    community: &str,
) -> Result<(), CliError> {
    let exclusions = ExclusionList::new(client.clone(), &config.catalog.exclusions_url);
    let synchronizer = Synchronizer::new(client, store, exclusions).with_events(event_sender);
    synchronizer
        .synchronize(community, &config.catalog.index_url(community))
        .await?;
    Ok(())
}

/// Stored snapshot for the community, synchronizing first when no catalog
/// has ever been fetched
async fn ensure_snapshot(
    config: &Config,
    client: &NetClient,
    store: &FileCatalogStore,
    event_sender: &EventSender,
    community: &str,
) -> Result<Snapshot, CliError> {
    if !store.has_catalog(community).await? {
        info!("no stored catalog for {community}, synchronizing first");
        synchronize(
            config,
            client.clone(),
            store.clone(),
            event_sender.clone(),
            community,
        )
        .await?;
    }
    Ok(store.snapshot(community).await?)
}

fn latest_version_of(snapshot: &Snapshot, package: &str) -> Result<Version, CliError> {
    let record = snapshot.get(package).ok_or(PackageError::NotFound {
        name: package.to_string(),
    });
    let record = record.map_err(modsync_errors::Error::from)?;
    let latest = record
        .latest()
        .ok_or(PackageError::NoVersions {
            name: package.to_string(),
        })
        .map_err(modsync_errors::Error::from)?;
    Ok(latest.version_number.clone())
}

/// Parse an exported list: one `namespace-name-1.2.3` per line, blank
/// lines and `#` comments skipped
async fn read_import_file(path: &std::path::Path) -> Result<Vec<(String, Version)>, CliError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| CliError::InvalidArguments(format!("cannot read {}: {e}", path.display())))?;

    let mut imports = Vec::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let dependency: Dependency = line.parse().map_err(|_| {
            CliError::InvalidArguments(format!("malformed entry '{line}' in import file"))
        })?;
        imports.push((dependency.full_name, dependency.version));
    }

    if imports.is_empty() {
        return Err(CliError::InvalidArguments(
            "import file contains no entries".to_string(),
        ));
    }
    Ok(imports)
}

fn effective_ignore_cache(config: &Config, flag: bool) -> bool {
    flag || !config.cache.honor_cache
}

fn net_config(config: &Config) -> NetConfig {
    NetConfig {
        timeout: Duration::from_secs(config.network.timeout),
        connect_timeout: Duration::from_secs(config.network.connect_timeout),
        retry_count: config.network.retries,
        retry_delay: Duration::from_secs(config.network.retry_delay),
        ..NetConfig::default()
    }
}

/// Initialize tracing/logging
fn init_tracing(debug: bool) {
    let default_filter = if debug { "info,modsync=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();
}
