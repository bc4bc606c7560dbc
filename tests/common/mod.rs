//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use sitehost::config::{apply_manifest, parse_config, AppConfig};
use sitehost::http::HttpServer;
use sitehost::lifecycle::Shutdown;
use sitehost::render::{HtmlRenderer, Renderer};
use sitehost::site::SiteRegistry;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// A running server on a loopback port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub sites: Arc<SiteRegistry>,
    #[allow(dead_code)]
    pub updates: mpsc::UnboundedSender<AppConfig>,
    shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a server for the TOML manifest using the built-in renderer.
pub async fn start_server(manifest: &str) -> TestServer {
    start_server_with(manifest, Arc::new(HtmlRenderer::new())).await
}

pub async fn start_server_with(manifest: &str, renderer: Arc<dyn Renderer>) -> TestServer {
    let config = parse_config(manifest).expect("manifest should be valid");
    let sites = Arc::new(SiteRegistry::new(renderer));
    apply_manifest(&sites, &config);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let (updates, update_rx) = mpsc::unbounded_channel();

    let server = HttpServer::new(config, sites.clone());
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, update_rx, server_shutdown).await;
    });

    TestServer {
        addr,
        sites,
        updates,
        shutdown,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap()
}

/// Poll `check` every 20ms for up to 5s.
#[allow(dead_code)]
pub async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..250 {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}
