//! Tenant sites: configuration objects and the structures derived from them.
//!
//! # Data Flow
//! ```text
//! SetTenant / SetPage / DeletePage / SetTranslation / DeleteTranslation
//!     → registry.rs (tenant name → handler)
//!     → handler.rs  (pages.rs + catalog.rs inputs)
//!     → rebuild: menu.rs (navigation tree) + render (HTML per page, per language)
//!     → ServingTable published atomically
//!
//! Request:
//!     registry.rs resolve(host) → handler.rs serve(path, language)
//! ```
//!
//! # Design Decisions
//! - The registry is an explicit value created at startup, no global state
//! - No lock is held across a call that can take the same lock again
//! - Configuration errors never leave a tenant without a table

pub mod catalog;
pub mod handler;
pub mod menu;
pub mod model;
pub mod pages;
pub mod registry;

pub use catalog::{Catalog, CatalogError, MessageResolver};
pub use handler::{ActiveTenant, ServingTable, TenantHandler};
pub use menu::{MenuError, NavEntry};
pub use model::{Page, Tenant, TranslationResource};
pub use pages::PageRegistry;
pub use registry::SiteRegistry;

use crate::routing::DomainError;

/// A tenant configuration that cannot be activated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SiteError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Language(#[from] CatalogError),
}
