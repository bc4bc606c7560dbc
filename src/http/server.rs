//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the dispatcher as catch-all handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Bind server to listener
//! - Apply configuration updates while serving
//! - Stop on the shutdown broadcast

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::{routing::any, Router};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::{apply_manifest, AppConfig};
use crate::http::dispatch::dispatch;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::site::SiteRegistry;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub sites: Arc<SiteRegistry>,
    /// Fallback body for unmatched hosts; replaced on every config update.
    pub welcome: Arc<ArcSwap<String>>,
}

/// HTTP front end for all tenants.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
    sites: Arc<SiteRegistry>,
    welcome: Arc<ArcSwap<String>>,
}

impl HttpServer {
    /// Create a server over an existing registry.
    pub fn new(config: AppConfig, sites: Arc<SiteRegistry>) -> Self {
        let welcome = Arc::new(ArcSwap::from_pointee(config.welcome.message.clone()));
        let state = AppState {
            sites: sites.clone(),
            welcome: welcome.clone(),
        };
        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            sites,
            welcome,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(dispatch))
            .route("/", any(dispatch))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// The router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn sites(&self) -> &Arc<SiteRegistry> {
        &self.sites
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Serve until `shutdown` fires, applying each config from `updates`.
    pub async fn run(
        self,
        listener: TcpListener,
        updates: mpsc::UnboundedReceiver<AppConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, tenants = self.sites.len(), "HTTP server starting");

        let update_loop = tokio::spawn(apply_updates(
            self.sites.clone(),
            self.welcome.clone(),
            updates,
            shutdown.resubscribe(),
        ));

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        update_loop.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Apply configuration updates one at a time until the channel closes or shutdown fires.
async fn apply_updates(
    sites: Arc<SiteRegistry>,
    welcome: Arc<ArcSwap<String>>,
    mut updates: mpsc::UnboundedReceiver<AppConfig>,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            update = updates.recv() => {
                let Some(config) = update else { break };
                welcome.store(Arc::new(config.welcome.message.clone()));
                let sites = sites.clone();
                // Rebuilds render every page; keep them off the async workers.
                match tokio::task::spawn_blocking(move || apply_manifest(&sites, &config)).await {
                    Ok(report) if !report.rejected.is_empty() => {
                        tracing::warn!(rejected = ?report.rejected, "Some tenants were rejected");
                    }
                    Ok(_) => {}
                    Err(e) => tracing::error!(error = %e, "Config update task failed"),
                }
            }
            _ = shutdown.recv() => break,
        }
    }
    tracing::debug!("Config update loop stopped");
}
