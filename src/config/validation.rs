//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (pages and translations name existing tenants)
//! - Check domain patterns, language tags and paths
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Parent references are not checked here; the menu builder omits orphans
//!   and reports cycles at rebuild time

use std::collections::HashSet;
use std::net::SocketAddr;

use crate::config::schema::AppConfig;
use crate::routing::matcher::{DomainError, DomainPattern};
use crate::site::catalog::validate_language;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid bind address '{0}'")]
    InvalidAddress(String),

    #[error("duplicate tenant '{0}'")]
    DuplicateTenant(String),

    #[error("tenant '{0}' has no domains")]
    NoDomains(String),

    #[error("tenant '{tenant}': {error}")]
    InvalidDomain { tenant: String, error: DomainError },

    #[error("tenant '{tenant}': invalid language tag '{language}'")]
    InvalidLanguage { tenant: String, language: String },

    #[error("{kind} '{name}' references unknown tenant '{tenant}'")]
    UnknownTenant {
        kind: &'static str,
        name: String,
        tenant: String,
    },

    #[error("tenant '{tenant}': duplicate {kind} '{name}'")]
    Duplicate {
        kind: &'static str,
        tenant: String,
        name: String,
    },

    #[error("tenant '{tenant}': page '{page}' path '{path}' must start with '/'")]
    InvalidPath { tenant: String, page: String, path: String },
}

pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress(config.listener.bind_address.clone()));
    }
    if config.observability.metrics_enabled && config.observability.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress(config.observability.metrics_address.clone()));
    }

    let mut tenants = HashSet::new();
    for tenant in &config.tenants {
        if !tenants.insert(tenant.name.as_str()) {
            errors.push(ValidationError::DuplicateTenant(tenant.name.clone()));
        }
        if tenant.domains.is_empty() {
            errors.push(ValidationError::NoDomains(tenant.name.clone()));
        }
        for pattern in &tenant.domains {
            if let Err(error) = DomainPattern::parse(pattern) {
                errors.push(ValidationError::InvalidDomain {
                    tenant: tenant.name.clone(),
                    error,
                });
            }
        }
        for language in tenant.supported_languages() {
            if validate_language(&language).is_err() {
                errors.push(ValidationError::InvalidLanguage {
                    tenant: tenant.name.clone(),
                    language,
                });
            }
        }
    }

    let mut pages = HashSet::new();
    for pc in &config.pages {
        if !tenants.contains(pc.tenant.as_str()) {
            errors.push(ValidationError::UnknownTenant {
                kind: "page",
                name: pc.page.name.clone(),
                tenant: pc.tenant.clone(),
            });
        }
        if !pages.insert((pc.tenant.as_str(), pc.page.name.as_str())) {
            errors.push(ValidationError::Duplicate {
                kind: "page",
                tenant: pc.tenant.clone(),
                name: pc.page.name.clone(),
            });
        }
        if !pc.page.path.starts_with('/') {
            errors.push(ValidationError::InvalidPath {
                tenant: pc.tenant.clone(),
                page: pc.page.name.clone(),
                path: pc.page.path.clone(),
            });
        }
    }

    let mut resources = HashSet::new();
    for tc in &config.translations {
        if !tenants.contains(tc.tenant.as_str()) {
            errors.push(ValidationError::UnknownTenant {
                kind: "translation",
                name: tc.resource.name.clone(),
                tenant: tc.tenant.clone(),
            });
        }
        if !resources.insert((tc.tenant.as_str(), tc.resource.name.as_str())) {
            errors.push(ValidationError::Duplicate {
                kind: "translation",
                tenant: tc.tenant.clone(),
                name: tc.resource.name.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
