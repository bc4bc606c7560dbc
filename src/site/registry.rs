//! Tenant registry.
//!
//! # Responsibilities
//! - Own one live `TenantHandler` per tenant name
//! - Resolve a Host header to its tenant
//!
//! # Design Decisions
//! - `DashMap` gives per-entry locking; no operation spans tenants
//! - Handlers are built and rebuilt outside any map guard
//! - Resolution scans a snapshot taken by `list`, never a live iterator

use std::sync::Arc;

use dashmap::DashMap;

use crate::render::Renderer;
use crate::routing::matcher;
use crate::site::handler::{ActiveTenant, TenantHandler};
use crate::site::model::Tenant;
use crate::site::SiteError;

pub struct SiteRegistry {
    tenants: DashMap<String, Arc<TenantHandler>>,
    renderer: Arc<dyn Renderer>,
}

impl SiteRegistry {
    pub fn new(renderer: Arc<dyn Renderer>) -> Self {
        Self {
            tenants: DashMap::new(),
            renderer,
        }
    }

    /// Register a handler under its tenant name, returning the one it replaced.
    pub fn set(&self, handler: Arc<TenantHandler>) -> Option<Arc<TenantHandler>> {
        self.tenants.insert(handler.name(), handler)
    }

    pub fn get(&self, name: &str) -> Option<Arc<TenantHandler>> {
        self.tenants.get(name).map(|h| h.value().clone())
    }

    pub fn delete(&self, name: &str) -> Option<Arc<TenantHandler>> {
        self.tenants.remove(name).map(|(_, h)| h)
    }

    /// Snapshot of all handlers in tenant name order.
    pub fn list(&self) -> Vec<Arc<TenantHandler>> {
        let mut handlers: Vec<Arc<TenantHandler>> = self.tenants.iter().map(|e| e.value().clone()).collect();
        handlers.sort_by_cached_key(|h| h.name());
        handlers
    }

    pub fn names(&self) -> Vec<String> {
        self.list().iter().map(|h| h.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tenants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tenants.is_empty()
    }

    /// Create or update the handler for `tenant`.
    ///
    /// An existing handler keeps its pages and translations and is rebuilt
    /// against the new configuration.
    pub fn set_tenant(&self, tenant: Tenant) -> Result<Arc<TenantHandler>, SiteError> {
        if let Some(existing) = self.get(&tenant.name) {
            existing.replace_tenant(tenant)?;
            return Ok(existing);
        }
        let name = tenant.name.clone();
        let handler = TenantHandler::new(tenant, self.renderer.clone())?;
        self.set(handler.clone());
        tracing::info!(tenant = %name, "Tenant registered");
        Ok(handler)
    }

    pub fn delete_tenant(&self, name: &str) -> Option<Arc<TenantHandler>> {
        let removed = self.delete(name);
        if removed.is_some() {
            tracing::info!(tenant = %name, "Tenant removed");
        }
        removed
    }

    /// Tenant owning `host` (port allowed), if any.
    pub fn resolve(&self, host: &str) -> Option<Arc<TenantHandler>> {
        let snapshot: Vec<(Arc<TenantHandler>, Arc<ActiveTenant>)> = self
            .list()
            .into_iter()
            .map(|h| {
                let active = h.tenant();
                (h, active)
            })
            .collect();
        matcher::resolve(host, snapshot.iter().map(|(h, t)| (h, t.domains.as_slice()))).cloned()
    }
}

impl std::fmt::Debug for SiteRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteRegistry").field("tenants", &self.names()).finish()
    }
}
