//! Domain matching.
//!
//! # Responsibilities
//! - Parse tenant domain patterns (exact or leading wildcard)
//! - Strip the port from a Host header
//! - Select the tenant owning a host
//!
//! # Design Decisions
//! - Host matching is case-insensitive (RFC 4343)
//! - The first exact match ends the search
//! - Otherwise the longest matching wildcard pattern wins
//! - A wildcard must consume at least one label

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("empty domain pattern")]
    Empty,

    #[error("invalid wildcard in '{0}': only a leading '*.' label is allowed")]
    InvalidWildcard(String),

    #[error("invalid character in domain pattern '{0}'")]
    InvalidCharacter(String),
}

/// A compiled tenant domain pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainPattern {
    /// `example.com`
    Exact(String),
    /// `*.example.com`; holds `.example.com`.
    Wildcard(String),
}

/// Outcome of testing one pattern against a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainMatch {
    Exact,
    /// Wildcard match with the pattern's length.
    Wildcard(usize),
}

impl DomainPattern {
    pub fn parse(pattern: &str) -> Result<Self, DomainError> {
        let pattern = pattern.trim().trim_end_matches('.').to_ascii_lowercase();
        if pattern.is_empty() {
            return Err(DomainError::Empty);
        }
        let (wildcard, body) = match pattern.strip_prefix("*.") {
            Some(rest) => (true, rest),
            None => (false, pattern.as_str()),
        };
        if body.is_empty() || body.contains('*') {
            return Err(DomainError::InvalidWildcard(pattern.clone()));
        }
        let valid = body
            .split('.')
            .all(|label| !label.is_empty() && label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-'));
        if !valid {
            return Err(DomainError::InvalidCharacter(pattern.clone()));
        }
        if wildcard {
            Ok(DomainPattern::Wildcard(format!(".{}", body)))
        } else {
            Ok(DomainPattern::Exact(pattern))
        }
    }

    /// Pattern string length, `*` included for wildcards.
    pub fn len(&self) -> usize {
        match self {
            DomainPattern::Exact(host) => host.len(),
            DomainPattern::Wildcard(suffix) => suffix.len() + 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Test a host that has already been normalised with [`normalize_host`].
    pub fn matches(&self, host: &str) -> Option<DomainMatch> {
        match self {
            DomainPattern::Exact(expected) if expected == host => Some(DomainMatch::Exact),
            DomainPattern::Wildcard(suffix) if host.len() > suffix.len() && host.ends_with(suffix.as_str()) => {
                Some(DomainMatch::Wildcard(self.len()))
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for DomainPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainPattern::Exact(host) => f.write_str(host),
            DomainPattern::Wildcard(suffix) => write!(f, "*{}", suffix),
        }
    }
}

/// Compile a list of patterns, failing on the first invalid one.
pub fn parse_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<DomainPattern>, DomainError> {
    patterns.iter().map(|p| DomainPattern::parse(p.as_ref())).collect()
}

/// Remove the port from a Host header value.
pub fn strip_port(host: &str) -> &str {
    if let Some(end) = host.strip_prefix('[').and_then(|h| h.find(']')) {
        // IPv6 literal: keep the brackets, drop what follows.
        return &host[..end + 2];
    }
    host.split(':').next().unwrap_or_default()
}

/// Lowercase, port removed, trailing dot removed.
pub fn normalize_host(host: &str) -> String {
    strip_port(host.trim()).trim_end_matches('.').to_ascii_lowercase()
}

/// Select the owner of `host` among `candidates`.
///
/// `host` may carry a port. Ties between equally long wildcards go to the
/// candidate seen first.
pub fn resolve<'a, T, I>(host: &str, candidates: I) -> Option<&'a T>
where
    I: IntoIterator<Item = (&'a T, &'a [DomainPattern])>,
{
    let host = normalize_host(host);
    let mut best: Option<(&'a T, usize)> = None;
    for (owner, patterns) in candidates {
        for pattern in patterns {
            match pattern.matches(&host) {
                Some(DomainMatch::Exact) => return Some(owner),
                Some(DomainMatch::Wildcard(len)) if best.map_or(true, |(_, l)| len > l) => {
                    best = Some((owner, len));
                }
                _ => {}
            }
        }
    }
    best.map(|(owner, _)| owner)
}
