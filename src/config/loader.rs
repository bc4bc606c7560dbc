//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SITE: &str = r#"
[listener]
bind_address = "127.0.0.1:8080"

[welcome]
message = "Nothing here"

[[tenants]]
name = "acme"
domains = ["acme.test", "*.acme.test"]
default_language = "en"
languages = ["en", "fr"]

[tenants.meta]
organization = "Acme"
stylesheets = ["/static/acme.css"]

[[pages]]
tenant = "acme"
name = "home"
path = "/"
title = "nav.home"

[pages.content.body]
main = "<h1>{{ greeting }}</h1>"

[[pages]]
tenant = "acme"
name = "about"
path = "/about"
parent = "home"

[pages.nav]
icon = "info"
weight = 5

[[translations]]
tenant = "acme"
name = "base"

[[translations.entries]]
language = "fr"
messages = { greeting = "Bonjour", "nav.home" = "Accueil" }
"#;

    #[test]
    fn test_parse_site_manifest() {
        let config = parse_config(SITE).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:8080");
        assert_eq!(config.welcome.message, "Nothing here");
        assert_eq!(config.timeouts.request_secs, 30);

        let tenant = &config.tenants[0];
        assert_eq!(tenant.domains, vec!["acme.test", "*.acme.test"]);
        assert_eq!(tenant.meta.organization, "Acme");

        assert_eq!(config.pages.len(), 2);
        assert_eq!(config.pages[0].page.content.body["main"], "<h1>{{ greeting }}</h1>");
        assert_eq!(config.pages[1].page.parent.as_deref(), Some("home"));
        assert_eq!(config.pages[1].page.nav.weight, 5);
        assert_eq!(config.pages[1].page.template, "default");

        let resource = &config.translations[0].resource;
        assert_eq!(resource.entries[0].messages["nav.home"], "Accueil");
    }

    #[test]
    fn test_invalid_config() {
        let err = parse_config("[[pages]]\ntenant = \"x\"\nname = \"p\"\npath = \"/\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("unknown tenant 'x'"));

        assert!(matches!(parse_config("listener = 3"), Err(ConfigError::Parse(_))));
        assert!(matches!(
            load_config(Path::new("/definitely/not/here.toml")),
            Err(ConfigError::Io(_))
        ));
    }
}
