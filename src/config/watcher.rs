//! Configuration file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::AppConfig;

/// Watches the configuration file and sends each valid reload downstream.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<AppConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and the receiving end of the update channel.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<AppConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching. The returned handle must be kept alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx;
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if event.kind.is_modify() || event.kind.is_create() => reload(&path, &tx),
                Ok(_) => {}
                Err(e) => tracing::error!(error = %e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;
        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(watcher)
    }
}

fn reload(path: &Path, tx: &mpsc::UnboundedSender<AppConfig>) {
    match load_config(path) {
        Ok(config) => {
            tracing::info!(
                path = ?path,
                tenants = config.tenants.len(),
                pages = config.pages.len(),
                translations = config.translations.len(),
                "Config reloaded"
            );
            if tx.send(config).is_err() {
                tracing::debug!("Config update receiver dropped");
            }
        }
        Err(e) => {
            tracing::error!(path = ?path, error = %e, "Config reload rejected, keeping current configuration");
        }
    }
}
