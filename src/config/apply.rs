//! Reconcile the tenant registry with a site manifest.
//!
//! Everything here goes through the public mutation API: `set_tenant`,
//! `set_page` / `delete_page`, `set_translation` / `delete_translation`.
//! Unchanged objects are skipped so they do not trigger rebuilds.

use std::collections::{HashMap, HashSet};

use crate::config::schema::AppConfig;
use crate::site::model::{Page, TranslationResource};
use crate::site::SiteRegistry;

/// What `apply_manifest` changed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ApplyReport {
    pub tenants_set: usize,
    pub tenants_removed: usize,
    pub pages_set: usize,
    pub pages_removed: usize,
    pub translations_set: usize,
    pub translations_removed: usize,
    /// Tenants whose translation order was changed to match the manifest.
    pub translations_reordered: usize,
    /// Tenants that could not be activated.
    pub rejected: Vec<String>,
}

pub fn apply_manifest(registry: &SiteRegistry, config: &AppConfig) -> ApplyReport {
    let mut report = ApplyReport::default();

    let mut pages: HashMap<&str, Vec<&Page>> = HashMap::new();
    for pc in &config.pages {
        pages.entry(pc.tenant.as_str()).or_default().push(&pc.page);
    }
    let mut translations: HashMap<&str, Vec<&TranslationResource>> = HashMap::new();
    for tc in &config.translations {
        translations.entry(tc.tenant.as_str()).or_default().push(&tc.resource);
    }

    let wanted: HashSet<&str> = config.tenants.iter().map(|t| t.name.as_str()).collect();
    for name in registry.names() {
        if !wanted.contains(name.as_str()) && registry.delete_tenant(&name).is_some() {
            report.tenants_removed += 1;
        }
    }

    for tenant in &config.tenants {
        let changed = registry.get(&tenant.name).map_or(true, |h| h.tenant().tenant != *tenant);
        let handler = if changed {
            match registry.set_tenant(tenant.clone()) {
                Ok(h) => {
                    report.tenants_set += 1;
                    h
                }
                Err(e) => {
                    tracing::warn!(tenant = %tenant.name, error = %e, "Tenant rejected");
                    report.rejected.push(tenant.name.clone());
                    continue;
                }
            }
        } else {
            match registry.get(&tenant.name) {
                Some(h) => h,
                None => continue,
            }
        };

        let tenant_pages = pages.remove(tenant.name.as_str()).unwrap_or_default();
        let keep: HashSet<&str> = tenant_pages.iter().map(|p| p.name.as_str()).collect();
        for name in handler.pages().names() {
            if !keep.contains(name.as_str()) && handler.delete_page(&name).is_some() {
                report.pages_removed += 1;
            }
        }
        for page in tenant_pages {
            if handler.pages().get(&page.name).as_ref() != Some(page) {
                handler.set_page(page.clone());
                report.pages_set += 1;
            }
        }

        let tenant_translations = translations.remove(tenant.name.as_str()).unwrap_or_default();
        let order: Vec<&str> = tenant_translations.iter().map(|r| r.name.as_str()).collect();
        let keep: HashSet<&str> = order.iter().copied().collect();
        for name in handler.translation_names() {
            if !keep.contains(name.as_str()) && handler.delete_translation(&name).is_some() {
                report.translations_removed += 1;
            }
        }
        for resource in tenant_translations {
            if handler.translation(&resource.name).as_ref() != Some(resource) {
                handler.set_translation(resource.clone());
                report.translations_set += 1;
            }
        }
        // Manifest order decides which resource wins, on reload as on start.
        if handler.reorder_translations(&order) {
            report.translations_reordered += 1;
        }
    }

    tracing::info!(
        tenants_set = report.tenants_set,
        tenants_removed = report.tenants_removed,
        pages_set = report.pages_set,
        pages_removed = report.pages_removed,
        translations_set = report.translations_set,
        translations_removed = report.translations_removed,
        translations_reordered = report.translations_reordered,
        rejected = report.rejected.len(),
        "Site manifest applied"
    );
    report
}
