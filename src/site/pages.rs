//! Per-tenant page registry.
//!
//! # Responsibilities
//! - Store page definitions by name
//! - Notify the owner after every mutation
//!
//! # Design Decisions
//! - One `RwLock` guards the map; the listener is called only after the
//!   guard has been dropped, because it re-enters the owning tenant handler
//!   which reads this registry again
//! - Iteration order is page name order, so rebuilds are deterministic

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use crate::site::model::Page;

/// Callback invoked after a mutation.
pub type ChangeListener = Box<dyn Fn() + Send + Sync>;

pub struct PageRegistry {
    pages: RwLock<BTreeMap<String, Page>>,
    listener: Option<ChangeListener>,
}

impl PageRegistry {
    /// A registry nobody listens to.
    pub fn new() -> Self {
        Self {
            pages: RwLock::new(BTreeMap::new()),
            listener: None,
        }
    }

    pub fn with_listener(listener: ChangeListener) -> Self {
        Self {
            pages: RwLock::new(BTreeMap::new()),
            listener: Some(listener),
        }
    }

    /// Insert or replace a page, then notify.
    pub fn set(&self, page: Page) {
        {
            let mut pages = self.pages.write().unwrap_or_else(PoisonError::into_inner);
            pages.insert(page.name.clone(), page);
        }
        self.notify();
    }

    /// Remove a page. Notifies only when something was removed.
    pub fn delete(&self, name: &str) -> Option<Page> {
        let removed = {
            let mut pages = self.pages.write().unwrap_or_else(PoisonError::into_inner);
            pages.remove(name)
        };
        if removed.is_some() {
            self.notify();
        }
        removed
    }

    pub fn get(&self, name: &str) -> Option<Page> {
        self.pages
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Snapshot of all pages in name order.
    pub fn list(&self) -> Vec<Page> {
        self.pages
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.pages
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.pages.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn notify(&self) {
        if let Some(listener) = &self.listener {
            listener();
        }
    }
}

impl Default for PageRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PageRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageRegistry")
            .field("pages", &self.names())
            .field("listener", &self.listener.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, OnceLock};

    #[test]
    fn test_set_get_delete() {
        let registry = PageRegistry::new();
        registry.set(Page::new("home", "/"));
        registry.set(Page::new("about", "/about"));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("about").unwrap().path, "/about");
        assert_eq!(registry.names(), vec!["about", "home"]);

        assert!(registry.delete("about").is_some());
        assert!(registry.delete("about").is_none());
        assert!(registry.get("about").is_none());
    }

    #[test]
    fn test_listener_runs_without_lock_held() {
        let registry: Arc<OnceLock<Arc<PageRegistry>>> = Arc::new(OnceLock::new());
        let seen = Arc::new(AtomicUsize::new(0));

        let (r, s) = (registry.clone(), seen.clone());
        let pages = Arc::new(PageRegistry::with_listener(Box::new(move || {
            // Reads back into the registry; would deadlock if the write guard were still held.
            if let Some(reg) = r.get() {
                s.store(reg.list().len(), Ordering::SeqCst);
            }
        })));
        registry.set(pages.clone()).unwrap();

        pages.set(Page::new("home", "/"));
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        pages.set(Page::new("about", "/about"));
        assert_eq!(seen.load(Ordering::SeqCst), 2);
        pages.delete("home");
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }
}
