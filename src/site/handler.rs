//! Tenant handler: one tenant's inputs and its published serving table.
//!
//! # Data Flow
//! ```text
//! set_page / delete_page ──▶ PageRegistry ──(lock released)──▶ rebuild()
//! set_translation / delete_translation ─────────────────────▶ rebuild()
//! replace_tenant ───────────────────────────────────────────▶ rebuild()
//!
//! rebuild():
//!     lock rebuild mutex (serialises rebuilds, owns the generation counter)
//!     → snapshot tenant, pages, translations (each lock held only to copy)
//!     → Catalog::build, MenuIndex::new
//!     → render every (page, language); failures are logged and omitted
//!     → ArcSwap::store(new ServingTable)
//!
//! serve(path, language):
//!     ArcSwap::load → lookup → Bytes
//! ```
//!
//! # Design Decisions
//! - Readers never block: the table is published through `ArcSwap`
//! - Rebuilds are serialised, so a slower older rebuild can never overwrite a newer table
//! - A table is published before the constructor returns
//! - Renderers must not call back into the handler that is rendering

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};
use std::time::Instant;

use arc_swap::ArcSwap;
use bytes::Bytes;

use crate::observability::metrics;
use crate::render::{Fragments, NavContext, RenderError, Renderer};
use crate::routing::matcher::{parse_patterns, DomainPattern};
use crate::site::catalog::{validate_language, Catalog, LocalizedMessages, TranslationSet};
use crate::site::menu::{LinkStyle, MenuIndex};
use crate::site::model::{normalize_path, Page, Tenant, TranslationResource};
use crate::site::pages::PageRegistry;
use crate::site::SiteError;

/// A tenant configuration with its domain patterns compiled.
#[derive(Debug, Clone)]
pub struct ActiveTenant {
    pub tenant: Tenant,
    pub domains: Vec<DomainPattern>,
    /// Supported languages, default included.
    pub languages: Vec<String>,
}

impl ActiveTenant {
    pub fn compile(tenant: Tenant) -> Result<Self, SiteError> {
        let domains = parse_patterns(&tenant.domains)?;
        let languages = tenant.supported_languages();
        for language in &languages {
            validate_language(language)?;
        }
        Ok(Self {
            tenant,
            domains,
            languages,
        })
    }

    pub fn name(&self) -> &str {
        &self.tenant.name
    }

    pub fn default_language(&self) -> &str {
        &self.tenant.default_language
    }
}

/// Published mapping from (path, language) to rendered HTML.
#[derive(Debug, Default)]
pub struct ServingTable {
    generation: u64,
    routes: HashMap<String, HashMap<String, Bytes>>,
    omitted: usize,
}

impl ServingTable {
    /// Look up a rendered page. `path` must already be normalised.
    pub fn get(&self, path: &str, language: &str) -> Option<&Bytes> {
        self.routes.get(path)?.get(language)
    }

    pub fn contains_path(&self, path: &str) -> bool {
        self.routes.contains_key(path)
    }

    /// Languages a path was rendered in, sorted.
    pub fn languages(&self, path: &str) -> Vec<&str> {
        let mut langs: Vec<&str> = self
            .routes
            .get(path)
            .map(|m| m.keys().map(String::as_str).collect())
            .unwrap_or_default();
        langs.sort_unstable();
        langs
    }

    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.routes.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }

    /// Rebuild that produced this table; 0 for the initial empty table.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// (page, language) pairs left out because they failed to render.
    pub fn omitted(&self) -> usize {
        self.omitted
    }

    /// Number of rendered (page, language) pairs.
    pub fn len(&self) -> usize {
        self.routes.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

pub struct TenantHandler {
    active: ArcSwap<ActiveTenant>,
    pages: PageRegistry,
    translations: RwLock<TranslationSet>,
    renderer: Arc<dyn Renderer>,
    rebuild_lock: Mutex<u64>,
    table: ArcSwap<ServingTable>,
}

impl TenantHandler {
    /// Create a handler and publish its first table before returning.
    pub fn new(tenant: Tenant, renderer: Arc<dyn Renderer>) -> Result<Arc<Self>, SiteError> {
        let active = ActiveTenant::compile(tenant)?;
        let handler = Arc::new_cyclic(|weak: &Weak<TenantHandler>| {
            let weak = weak.clone();
            TenantHandler {
                active: ArcSwap::from_pointee(active),
                pages: PageRegistry::with_listener(Box::new(move || {
                    if let Some(handler) = weak.upgrade() {
                        handler.rebuild();
                    }
                })),
                translations: RwLock::new(TranslationSet::new()),
                renderer,
                rebuild_lock: Mutex::new(0),
                table: ArcSwap::from_pointee(ServingTable::default()),
            }
        });
        handler.rebuild();
        Ok(handler)
    }

    pub fn name(&self) -> String {
        self.active.load().tenant.name.clone()
    }

    /// Current tenant configuration.
    pub fn tenant(&self) -> Arc<ActiveTenant> {
        self.active.load_full()
    }

    pub fn pages(&self) -> &PageRegistry {
        &self.pages
    }

    /// Currently published table. Stays valid after later rebuilds.
    pub fn table(&self) -> Arc<ServingTable> {
        self.table.load_full()
    }

    /// Rendered HTML for `path` in `language`, if published.
    pub fn serve(&self, path: &str, language: &str) -> Option<Bytes> {
        let path = normalize_path(path);
        self.table.load().get(&path, language).cloned()
    }

    /// Replace the tenant configuration wholesale and rebuild.
    pub fn replace_tenant(&self, tenant: Tenant) -> Result<(), SiteError> {
        let active = ActiveTenant::compile(tenant)?;
        self.active.store(Arc::new(active));
        self.rebuild();
        Ok(())
    }

    pub fn set_page(&self, page: Page) {
        self.pages.set(page);
    }

    pub fn delete_page(&self, name: &str) -> Option<Page> {
        self.pages.delete(name)
    }

    pub fn set_translation(&self, resource: TranslationResource) {
        {
            let mut set = self.translations.write().unwrap_or_else(PoisonError::into_inner);
            set.set(resource);
        }
        self.rebuild();
    }

    pub fn delete_translation(&self, name: &str) -> Option<TranslationResource> {
        let removed = {
            let mut set = self.translations.write().unwrap_or_else(PoisonError::into_inner);
            set.delete(name)
        };
        if removed.is_some() {
            self.rebuild();
        }
        removed
    }

    /// Make registration order follow `names`; rebuilds only when it changed.
    pub fn reorder_translations(&self, names: &[&str]) -> bool {
        let changed = {
            let mut set = self.translations.write().unwrap_or_else(PoisonError::into_inner);
            set.reorder(names)
        };
        if changed {
            self.rebuild();
        }
        changed
    }

    pub fn translation(&self, name: &str) -> Option<TranslationResource> {
        self.translations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Names of registered translation resources in registration order.
    pub fn translation_names(&self) -> Vec<String> {
        self.translations.read().unwrap_or_else(PoisonError::into_inner).names()
    }

    /// The catalog the next rebuild would use.
    pub fn catalog(&self) -> Catalog {
        let resources = self.translations.read().unwrap_or_else(PoisonError::into_inner).ordered();
        Catalog::build(&resources)
    }

    /// Recompute navigation, render every page in every language, publish.
    pub fn rebuild(&self) -> Arc<ServingTable> {
        let mut generation = self.rebuild_lock.lock().unwrap_or_else(PoisonError::into_inner);
        *generation += 1;
        let started = Instant::now();

        let active = self.active.load_full();
        let tenant = active.name();
        let pages = self.pages.list();
        let catalog = self.catalog();

        let index = MenuIndex::new(&pages);
        for error in index.errors() {
            tracing::warn!(tenant = %tenant, error = %error, "Navigation configuration error");
        }

        // First page (in name order) to claim a path owns it.
        let mut owners: HashMap<String, &str> = HashMap::with_capacity(pages.len());
        let mut servable: Vec<(&Page, String)> = Vec::with_capacity(pages.len());
        for page in &pages {
            let path = normalize_path(&page.path);
            if let Some(owner) = owners.get(&path) {
                tracing::warn!(
                    tenant = %tenant,
                    page = %page.name,
                    owner = %owner,
                    path = %path,
                    "Duplicate page path, page not served"
                );
                continue;
            }
            owners.insert(path.clone(), &page.name);
            servable.push((page, path));
        }

        let mut routes: HashMap<String, HashMap<String, Bytes>> = HashMap::with_capacity(servable.len());
        let mut omitted = 0;
        for language in &active.languages {
            let messages = catalog.localized(language);
            let style = LinkStyle {
                language,
                default_language: active.default_language(),
            };
            let root = index.tree(style, &messages);

            for (page, path) in &servable {
                let nav = NavContext {
                    root: &root,
                    current: &page.name,
                    language,
                };
                match self.render_page(page, &active, &nav, &messages) {
                    Ok(html) => {
                        routes
                            .entry(path.clone())
                            .or_default()
                            .insert(language.clone(), Bytes::from(html));
                    }
                    Err(e) => {
                        omitted += 1;
                        tracing::warn!(
                            tenant = %tenant,
                            page = %page.name,
                            language = %language,
                            error = %e,
                            "Render failed, entry omitted"
                        );
                    }
                }
            }
        }

        let table = Arc::new(ServingTable {
            generation: *generation,
            routes,
            omitted,
        });
        self.table.store(table.clone());

        metrics::record_rebuild(tenant, started, omitted);
        tracing::debug!(
            tenant = %tenant,
            generation = *generation,
            entries = table.len(),
            omitted,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Serving table published"
        );
        table
    }

    fn render_page(
        &self,
        page: &Page,
        active: &ActiveTenant,
        nav: &NavContext<'_>,
        messages: &LocalizedMessages<'_>,
    ) -> Result<String, RenderError> {
        let fragments = Fragments::for_page(page, &active.tenant.meta);
        let renderer = self.renderer.as_ref();
        catch_unwind(AssertUnwindSafe(|| {
            renderer.render(&page.template, &fragments, nav, messages)
        }))
        .unwrap_or_else(|panic| Err(RenderError::Panicked(panic_message(panic.as_ref()))))
    }
}

impl std::fmt::Debug for TenantHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let table = self.table.load();
        f.debug_struct("TenantHandler")
            .field("tenant", &self.active.load().tenant.name)
            .field("pages", &self.pages.len())
            .field("generation", &table.generation)
            .field("entries", &table.len())
            .finish()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
