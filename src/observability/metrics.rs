//! Metrics collection and exposition.
//!
//! # Metrics
//! - `site_requests_total` (counter): dispatched requests by tenant, status
//! - `site_request_duration_seconds` (histogram): dispatch latency by tenant
//! - `site_rebuilds_total` (counter): serving table rebuilds by tenant
//! - `site_rebuild_duration_seconds` (histogram): rebuild latency by tenant
//! - `site_render_failures_total` (counter): omitted (page, language) pairs by tenant

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Tenant label for requests that matched no tenant.
pub const NO_TENANT: &str = "none";

/// Start the Prometheus scrape endpoint. Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(tenant: &str, status: u16, start: Instant) {
    let tenant = tenant.to_string();
    ::metrics::counter!(
        "site_requests_total",
        "tenant" => tenant.clone(),
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!("site_request_duration_seconds", "tenant" => tenant)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_rebuild(tenant: &str, start: Instant, omitted: usize) {
    let tenant = tenant.to_string();
    ::metrics::counter!("site_rebuilds_total", "tenant" => tenant.clone()).increment(1);
    ::metrics::histogram!("site_rebuild_duration_seconds", "tenant" => tenant.clone())
        .record(start.elapsed().as_secs_f64());
    if omitted > 0 {
        ::metrics::counter!("site_render_failures_total", "tenant" => tenant).increment(omitted as u64);
    }
}
