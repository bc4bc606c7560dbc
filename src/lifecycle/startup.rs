//! Startup orchestration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::mpsc;

use crate::config::watcher::ConfigWatcher;
use crate::config::{apply_manifest, load_config, AppConfig, ConfigError};
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::observability::{logging, metrics};
use crate::render::HtmlRenderer;
use crate::site::SiteRegistry;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("watcher: {0}")]
    Watch(#[from] notify::Error),

    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),
}

/// Options taken from the command line.
#[derive(Debug, Clone, Default)]
pub struct StartupOptions {
    /// Configuration file; built-in defaults when absent.
    pub config_path: Option<PathBuf>,
    /// Reload the configuration file when it changes.
    pub watch: bool,
}

/// Run the server until Ctrl+C.
pub async fn run(options: StartupOptions) -> Result<(), StartupError> {
    let config = match &options.config_path {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };

    logging::init_logging(&config.observability.log_level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "sitehost starting");

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let sites = Arc::new(SiteRegistry::new(Arc::new(HtmlRenderer::new())));
    {
        let sites = sites.clone();
        let config = config.clone();
        // Initial render happens before the listener binds.
        tokio::task::spawn_blocking(move || apply_manifest(&sites, &config))
            .await
            .map_err(std::io::Error::other)?;
    }

    let (watcher, updates) = match (&options.config_path, options.watch) {
        (Some(path), true) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (Some(watcher.run()?), updates)
        }
        _ => {
            // Sender dropped here; the update loop ends at once.
            let (_tx, rx) = mpsc::unbounded_channel();
            (None, rx)
        }
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, tenants = sites.len(), "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_ctrl_c();

    let server = HttpServer::new(config, sites);
    server.run(listener, updates, shutdown.subscribe()).await?;

    drop(watcher);
    tracing::info!("Shutdown complete");
    Ok(())
}
