//! Translation catalog.
//!
//! # Responsibilities
//! - Keep translation resources in registration order
//! - Merge them into one immutable per-language lookup
//! - Resolve message keys, falling back to the key itself
//!
//! # Design Decisions
//! - Order is an explicit sequence number, never map iteration order
//! - Replacing a resource keeps its original sequence; delete + add moves it last
//! - A bad entry is logged and skipped, the build always completes

use std::borrow::Cow;
use std::collections::HashMap;

use crate::site::model::TranslationResource;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("invalid language tag '{0}'")]
    InvalidLanguage(String),
}

/// Check that a language tag looks like `en`, `fr-CA` or `zh-Hant-TW`.
pub fn validate_language(tag: &str) -> Result<(), CatalogError> {
    let mut parts = tag.split('-');
    let primary = parts.next().unwrap_or_default();
    let primary_ok = (2..=8).contains(&primary.len()) && primary.bytes().all(|b| b.is_ascii_alphabetic());
    let rest_ok = parts.all(|p| (1..=8).contains(&p.len()) && p.bytes().all(|b| b.is_ascii_alphanumeric()));
    if primary_ok && rest_ok {
        Ok(())
    } else {
        Err(CatalogError::InvalidLanguage(tag.to_string()))
    }
}

/// Ordered set of translation resources owned by one tenant.
#[derive(Debug, Default, Clone)]
pub struct TranslationSet {
    next_seq: u64,
    resources: HashMap<String, (u64, TranslationResource)>,
}

impl TranslationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a resource. Returns true if it replaced one.
    pub fn set(&mut self, resource: TranslationResource) -> bool {
        if let Some(slot) = self.resources.get_mut(&resource.name) {
            slot.1 = resource;
            return true;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.resources.insert(resource.name.clone(), (seq, resource));
        false
    }

    /// Re-sequence the named resources so they follow `names` order.
    ///
    /// Unknown names are ignored. Returns false when the registration order
    /// already matches.
    pub fn reorder(&mut self, names: &[&str]) -> bool {
        let wanted: Vec<&str> = names
            .iter()
            .copied()
            .filter(|n| self.resources.contains_key(*n))
            .collect();
        if self.names().iter().map(String::as_str).eq(wanted.iter().copied()) {
            return false;
        }
        for name in wanted {
            if let Some(slot) = self.resources.get_mut(name) {
                slot.0 = self.next_seq;
                self.next_seq += 1;
            }
        }
        true
    }

    pub fn delete(&mut self, name: &str) -> Option<TranslationResource> {
        self.resources.remove(name).map(|(_, r)| r)
    }

    pub fn get(&self, name: &str) -> Option<&TranslationResource> {
        self.resources.get(name).map(|(_, r)| r)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.ordered().into_iter().map(|r| r.name).collect()
    }

    /// Resources in registration order.
    pub fn ordered(&self) -> Vec<TranslationResource> {
        let mut all: Vec<&(u64, TranslationResource)> = self.resources.values().collect();
        all.sort_by_key(|(seq, _)| *seq);
        all.into_iter().map(|(_, r)| r.clone()).collect()
    }
}

/// Merged message lookup: language -> key -> value.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Catalog {
    messages: HashMap<String, HashMap<String, String>>,
}

impl Catalog {
    /// Merge resources in the given order, last write wins.
    pub fn build(resources: &[TranslationResource]) -> Self {
        let mut catalog = Self::default();
        for resource in resources {
            for entry in &resource.entries {
                for (key, value) in &entry.messages {
                    if let Err(e) = catalog.set_string(&entry.language, key, value) {
                        tracing::warn!(
                            resource = %resource.name,
                            key = %key,
                            error = %e,
                            "Skipping translation entry"
                        );
                    }
                }
            }
        }
        catalog
    }

    pub fn set_string(&mut self, language: &str, key: &str, value: &str) -> Result<(), CatalogError> {
        validate_language(language)?;
        self.messages
            .entry(language.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    pub fn get(&self, language: &str, key: &str) -> Option<&str> {
        self.messages.get(language)?.get(key).map(String::as_str)
    }

    /// Resolve `key` for `language`, returning the key text when unmapped.
    pub fn resolve<'a>(&'a self, language: &str, key: &'a str) -> &'a str {
        self.get(language, key).unwrap_or(key)
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.messages.keys().map(String::as_str)
    }

    /// A resolver bound to one language.
    pub fn localized<'a>(&'a self, language: &'a str) -> LocalizedMessages<'a> {
        LocalizedMessages { catalog: self, language }
    }
}

/// Resolves message keys while rendering.
pub trait MessageResolver {
    fn language(&self) -> &str;

    fn message<'a>(&'a self, key: &'a str) -> Cow<'a, str>;
}

#[derive(Debug, Clone, Copy)]
pub struct LocalizedMessages<'a> {
    catalog: &'a Catalog,
    language: &'a str,
}

impl MessageResolver for LocalizedMessages<'_> {
    fn language(&self) -> &str {
        self.language
    }

    fn message<'a>(&'a self, key: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(self.catalog.resolve(self.language, key))
    }
}
