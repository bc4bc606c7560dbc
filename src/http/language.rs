//! Language negotiation.
//!
//! # Order
//! 1. Leading path segment naming a supported non-default language (`/fr/about`)
//! 2. `lang` query parameter
//! 3. `Accept-Language`, highest q first; full tag, then primary subtag
//! 4. Tenant default language
//!
//! Every step only yields languages the tenant supports. Tags compare
//! case-insensitively and the tenant's spelling is returned.

use std::borrow::Cow;

use percent_encoding::percent_decode_str;

use crate::site::ActiveTenant;

/// Where the negotiated language came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageSource {
    PathPrefix,
    Query,
    AcceptLanguage,
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Negotiated {
    /// Request path with any language prefix removed.
    pub path: String,
    pub language: String,
    pub source: LanguageSource,
}

pub fn negotiate(
    tenant: &ActiveTenant,
    path: &str,
    query: Option<&str>,
    accept_language: Option<&str>,
) -> Negotiated {
    if let Some((language, rest)) = split_language_prefix(tenant, path) {
        return Negotiated {
            path: rest.to_string(),
            language,
            source: LanguageSource::PathPrefix,
        };
    }

    let path = path.to_string();
    if let Some(language) = query.and_then(query_language).and_then(|l| supported(tenant, &l)) {
        return Negotiated {
            path,
            language,
            source: LanguageSource::Query,
        };
    }
    if let Some(language) = accept_language.and_then(|h| best_accepted(tenant, h)) {
        return Negotiated {
            path,
            language,
            source: LanguageSource::AcceptLanguage,
        };
    }
    Negotiated {
        path,
        language: tenant.default_language().to_string(),
        source: LanguageSource::Default,
    }
}

/// `(language, remaining path)` for `/fr/...` when `fr` is supported and not the default.
fn split_language_prefix<'p>(tenant: &ActiveTenant, path: &'p str) -> Option<(String, &'p str)> {
    let trimmed = path.strip_prefix('/')?;
    let (segment, rest) = match trimmed.find('/') {
        Some(i) => (&trimmed[..i], &trimmed[i..]),
        None => (trimmed, "/"),
    };
    let language = supported(tenant, segment)?;
    if language == tenant.default_language() {
        return None;
    }
    Some((language, rest))
}

fn supported(tenant: &ActiveTenant, tag: &str) -> Option<String> {
    tenant
        .languages
        .iter()
        .find(|l| l.eq_ignore_ascii_case(tag))
        .cloned()
}

fn query_language(query: &str) -> Option<Cow<'_, str>> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == "lang")
        .map(|(_, v)| percent_decode_str(v).decode_utf8_lossy())
        .filter(|v| !v.is_empty())
}

/// Parse an `Accept-Language` header into `(tag, q)`, best first.
///
/// Entries with `q=0` or an unparseable weight are dropped. Equal weights
/// keep header order.
pub fn parse_accept_language(header: &str) -> Vec<(String, f32)> {
    let mut entries: Vec<(String, f32)> = header
        .split(',')
        .filter_map(|item| {
            let mut parts = item.split(';');
            let tag = parts.next()?.trim();
            if tag.is_empty() {
                return None;
            }
            let mut q = 1.0_f32;
            for param in parts {
                if let Some(value) = param.trim().strip_prefix("q=") {
                    q = value.trim().parse().ok()?;
                }
            }
            (q > 0.0).then(|| (tag.to_string(), q))
        })
        .collect();
    entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    entries
}

fn best_accepted(tenant: &ActiveTenant, header: &str) -> Option<String> {
    for (tag, _) in parse_accept_language(header) {
        if tag == "*" {
            return None;
        }
        if let Some(language) = supported(tenant, &tag) {
            return Some(language);
        }
        let primary = tag.split('-').next().unwrap_or_default();
        let by_primary = tenant.languages.iter().find(|l| {
            l.split('-')
                .next()
                .is_some_and(|p| p.eq_ignore_ascii_case(primary))
        });
        if let Some(language) = by_primary {
            return Some(language.clone());
        }
    }
    None
}
