//! Configuration objects pushed into the engine.
//!
//! These are plain values. A new `Tenant` replaces the old one wholesale and
//! everything derived from it is rebuilt.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Template used when a page does not name one.
pub const DEFAULT_TEMPLATE: &str = "default";

/// An independently configured site.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Tenant {
    /// Unique tenant name.
    pub name: String,

    /// Domain patterns owned by this tenant (`example.com`, `*.example.com`).
    pub domains: Vec<String>,

    /// Language served when negotiation finds nothing better.
    pub default_language: String,

    /// Supported languages in display order.
    #[serde(default)]
    pub languages: Vec<String>,

    /// Page-wide metadata shared by every page.
    #[serde(default)]
    pub meta: SiteMeta,
}

impl Tenant {
    pub fn new(name: impl Into<String>, default_language: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domains: Vec::new(),
            default_language: default_language.into(),
            languages: Vec::new(),
            meta: SiteMeta::default(),
        }
    }

    pub fn with_domain(mut self, pattern: impl Into<String>) -> Self {
        self.domains.push(pattern.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.languages.push(language.into());
        self
    }

    /// Every language pages are rendered in.
    ///
    /// The default language is always included, in front when the configured
    /// list does not mention it. Duplicates are dropped.
    pub fn supported_languages(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::with_capacity(self.languages.len() + 1);
        if !self.languages.iter().any(|l| l == &self.default_language) {
            out.push(self.default_language.clone());
        }
        for lang in &self.languages {
            if !out.contains(lang) {
                out.push(lang.clone());
            }
        }
        out
    }

    pub fn supports(&self, language: &str) -> bool {
        language == self.default_language || self.languages.iter().any(|l| l == language)
    }
}

/// Shared metadata rendered into every page of a tenant.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteMeta {
    pub organization: String,
    pub stylesheets: Vec<String>,
    /// Raw HTML appended to `<head>`.
    pub head: String,
}

/// A page definition within one tenant.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Page {
    /// Unique page name within the tenant.
    pub name: String,

    /// Request path, e.g. `/about`.
    pub path: String,

    /// Name of the parent page in the navigation tree.
    #[serde(default)]
    pub parent: Option<String>,

    /// Title, also used as the navigation label. May be a message key.
    #[serde(default)]
    pub title: String,

    #[serde(default = "default_template")]
    pub template: String,

    #[serde(default)]
    pub content: PageContent,

    #[serde(default)]
    pub nav: NavHint,
}

fn default_template() -> String {
    DEFAULT_TEMPLATE.to_string()
}

impl Page {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            title: name.clone(),
            name,
            path: path.into(),
            parent: None,
            template: default_template(),
            content: PageContent::default(),
            nav: NavHint::default(),
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_body(mut self, slot: impl Into<String>, html: impl Into<String>) -> Self {
        self.content.body.insert(slot.into(), html.into());
        self
    }

    pub fn with_weight(mut self, weight: i32) -> Self {
        self.nav.weight = weight;
        self
    }

    /// Label shown in navigation; falls back to the page name.
    pub fn label(&self) -> &str {
        if self.title.is_empty() {
            &self.name
        } else {
            &self.title
        }
    }
}

/// Named content fragments of a page.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PageContent {
    pub header: String,
    pub footer: String,
    /// Per-slot body content.
    pub body: BTreeMap<String, String>,
    /// Per-slot navigation overrides.
    pub navigation: BTreeMap<String, String>,
}

/// How a page appears in navigation. Zero weight and no icon by default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct NavHint {
    pub icon: Option<String>,
    pub weight: i32,
}

/// A named set of per-language message overrides.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TranslationResource {
    pub name: String,
    /// Applied in order; later entries overwrite earlier ones.
    #[serde(default)]
    pub entries: Vec<TranslationEntry>,
}

impl TranslationResource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    pub fn with_message(
        mut self,
        language: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        let language = language.into();
        let (key, value) = (key.into(), value.into());
        match self.entries.iter_mut().rev().find(|e| e.language == language) {
            Some(entry) => {
                entry.messages.insert(key, value);
            }
            None => {
                let mut messages = BTreeMap::new();
                messages.insert(key, value);
                self.entries.push(TranslationEntry { language, messages });
            }
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TranslationEntry {
    pub language: String,
    #[serde(default)]
    pub messages: BTreeMap<String, String>,
}

/// Normalise a request or page path: leading `/`, no trailing `/` except root.
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return "/".to_string();
    }
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}
