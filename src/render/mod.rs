//! Page rendering subsystem.
//!
//! # Data Flow
//! ```text
//! tenant handler rebuild
//!     → Fragments::for_page (page content + tenant metadata)
//!     → NavContext           (navigation tree for this language, current page)
//!     → Renderer::render     (templating collaborator)
//!     → HTML string, or RenderError → (page, language) omitted
//! ```
//!
//! # Design Decisions
//! - The templating engine sits behind the `Renderer` trait
//! - `HtmlRenderer` is the built-in engine used by the binary
//! - Renderers are pure: identical inputs give identical output

pub mod html;

use std::collections::BTreeMap;

use crate::site::catalog::MessageResolver;
use crate::site::menu::NavEntry;
use crate::site::model::{Page, SiteMeta};

pub use html::HtmlRenderer;

pub const TITLE: &str = "title";
pub const HEADER: &str = "header";
pub const FOOTER: &str = "footer";
pub const ORGANIZATION: &str = "site.organization";
pub const HEAD: &str = "site.head";
pub const STYLESHEETS: &str = "site.stylesheets";
pub const BODY_PREFIX: &str = "body.";
pub const NAV_PREFIX: &str = "nav.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("unknown template '{0}'")]
    UnknownTemplate(String),

    #[error("unterminated placeholder in fragment '{fragment}' at byte {offset}")]
    UnterminatedPlaceholder { fragment: String, offset: usize },

    #[error("template '{template}' requires fragment '{fragment}'")]
    MissingFragment { template: String, fragment: String },

    #[error("renderer panicked: {0}")]
    Panicked(String),
}

/// Named content fragments handed to a renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragments(BTreeMap<String, String>);

impl Fragments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Page content plus tenant-wide metadata.
    pub fn for_page(page: &Page, meta: &SiteMeta) -> Self {
        let mut f = Self::new();
        f.insert(TITLE, page.label());
        f.insert(HEADER, &page.content.header);
        f.insert(FOOTER, &page.content.footer);
        for (slot, html) in &page.content.body {
            f.insert(format!("{}{}", BODY_PREFIX, slot), html);
        }
        for (slot, html) in &page.content.navigation {
            f.insert(format!("{}{}", NAV_PREFIX, slot), html);
        }
        f.insert(ORGANIZATION, &meta.organization);
        f.insert(HEAD, &meta.head);
        f.insert(STYLESHEETS, meta.stylesheets.join("\n"));
        f
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Fragments whose name starts with `prefix`, prefix stripped, in name order.
    pub fn slots<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.0
            .iter()
            .filter_map(move |(k, v)| k.strip_prefix(prefix).map(|slot| (slot, v.as_str())))
    }
}

/// Navigation handed to a renderer for one page in one language.
#[derive(Debug, Clone, Copy)]
pub struct NavContext<'a> {
    pub root: &'a NavEntry,
    /// Name of the page being rendered.
    pub current: &'a str,
    pub language: &'a str,
}

impl<'a> NavContext<'a> {
    /// Ancestors of the current page, top level first, current page last.
    pub fn breadcrumbs(&self) -> Vec<&'a NavEntry> {
        self.root.trail(self.current)
    }
}

/// The templating collaborator.
pub trait Renderer: Send + Sync {
    fn render(
        &self,
        template: &str,
        fragments: &Fragments,
        nav: &NavContext<'_>,
        messages: &dyn MessageResolver,
    ) -> Result<String, RenderError>;
}
