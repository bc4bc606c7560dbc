//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure: server settings
//! plus the site manifest (tenants, pages, translation resources).
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::site::model::{Page, Tenant, TranslationResource};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Response for hosts that match no tenant.
    pub welcome: WelcomeConfig,

    /// Tenant definitions.
    pub tenants: Vec<Tenant>,

    /// Page definitions, each naming its tenant.
    pub pages: Vec<PageConfig>,

    /// Translation resources, each naming its tenant.
    pub translations: Vec<TranslationConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Fallback response settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WelcomeConfig {
    pub message: String,
}

impl Default for WelcomeConfig {
    fn default() -> Self {
        Self {
            message: "Welcome! No site is configured for this domain.".to_string(),
        }
    }
}

/// A page bound to a tenant.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PageConfig {
    pub tenant: String,

    #[serde(flatten)]
    pub page: Page,
}

/// A translation resource bound to a tenant.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranslationConfig {
    pub tenant: String,

    #[serde(flatten)]
    pub resource: TranslationResource,
}
