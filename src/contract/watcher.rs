//! Registry index watcher for hot reload.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::contract::registry::ContractRegistry;
use crate::contract::types::LoadReport;

/// Reloads a [`ContractRegistry`] whenever its index file changes.
///
/// Every reload produces a [`LoadReport`] on the returned channel, so skipped
/// entries are observable rather than only logged.
pub struct RegistryWatcher {
    path: PathBuf,
    registry: Arc<ContractRegistry>,
    report_tx: mpsc::UnboundedSender<LoadReport>,
}

impl RegistryWatcher {
    /// Returns the watcher and a receiver for load reports.
    pub fn new(path: &Path, registry: Arc<ContractRegistry>) -> (Self, mpsc::UnboundedReceiver<LoadReport>) {
        let (report_tx, report_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                registry,
                report_tx,
            },
            report_rx,
        )
    }

    /// Start watching. Dropping the returned handle stops it.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self {
            path,
            registry,
            report_tx,
        } = self;
        let index_path = path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!(index = %index_path.display(), "Registry index changed, reloading");
                        match registry.load(&index_path) {
                            Ok(report) => {
                                let _ = report_tx.send(report);
                            }
                            Err(e) => {
                                tracing::error!(error = %e, "Failed to reload registry, keeping current contracts");
                            }
                        }
                    }
                }
                Err(e) => tracing::error!(error = ?e, "Registry watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?path, "Registry watcher started");
        Ok(watcher)
    }
}
