//! Event handling and progress display

use console::style;
use modsync_events::{AppEvent, DownloadEvent, GeneralEvent, SyncEvent};
use modsync_types::DownloadStatus;

/// Renders engine events as terminal output
///
/// Byte-level download progress arrives far faster than a terminal can
/// usefully show, so percentage lines are throttled to five-point steps.
pub struct EventHandler {
    debug: bool,
    last_percent: f64,
}

impl EventHandler {
    pub fn new(debug: bool) -> Self {
        Self {
            debug,
            last_percent: -1.0,
        }
    }

    /// Handle incoming event
    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Sync(sync) => self.handle_sync(&sync),
            AppEvent::Download(download) => self.handle_download(&download),
            AppEvent::General(general) => self.handle_general(&general),
        }
    }

    fn handle_sync(&mut self, event: &SyncEvent) {
        match event {
            SyncEvent::Started { community } => {
                println!("Syncing catalog for {community}...");
                self.last_percent = -1.0;
            }
            SyncEvent::Progress {
                completed,
                total,
                percent,
                ..
            } => {
                if self.step_reached(*percent) {
                    println!("  fetched {completed}/{total} ({percent:.0}%)");
                }
            }
            SyncEvent::UpToDate { community } => {
                println!(
                    "{} {community}: catalog already up to date",
                    style("✓").green()
                );
            }
            SyncEvent::Completed {
                community,
                package_count,
            } => {
                println!(
                    "{} {community}: {package_count} packages",
                    style("✓").green()
                );
            }
            SyncEvent::Failed { community, error } => {
                eprintln!("{} sync failed for {community}: {error}", style("✗").red());
            }
        }
    }

    fn handle_download(&mut self, event: &DownloadEvent) {
        match event {
            DownloadEvent::BatchStarted {
                to_download, total, ..
            } => {
                println!("Downloading {to_download} of {total} entries...");
                self.last_percent = -1.0;
            }
            DownloadEvent::Progress {
                full_name,
                status,
                percent,
                ..
            } => match status {
                DownloadStatus::Cached => {
                    println!("  {full_name} {}", style("(cached)").dim());
                }
                DownloadStatus::Downloading => {
                    if self.step_reached(*percent) {
                        println!("  {full_name} {percent:.0}%");
                    }
                }
                DownloadStatus::Done => {
                    println!("  {} {full_name}", style("✓").green());
                }
                _ => {}
            },
            DownloadEvent::Failed {
                full_name, error, ..
            } => {
                eprintln!("{} {full_name}: {error}", style("✗").red());
            }
            DownloadEvent::Completed { entries, .. } => {
                println!("{} {} entries ready", style("✓").green(), entries.len());
            }
        }
    }

    fn handle_general(&self, event: &GeneralEvent) {
        match event {
            GeneralEvent::Debug { message } => {
                if self.debug {
                    eprintln!("{} {message}", style("debug:").dim());
                }
            }
            GeneralEvent::Warning { message } => {
                eprintln!("{} {message}", style("warning:").yellow());
            }
            GeneralEvent::Error { message } => {
                eprintln!("{} {message}", style("error:").red());
            }
        }
    }

    fn step_reached(&mut self, percent: f64) -> bool {
        if percent >= self.last_percent + 5.0 || percent >= 100.0 {
            self.last_percent = percent;
            return true;
        }
        false
    }
}
