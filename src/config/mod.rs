//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → apply.rs (reconcile SiteRegistry with the manifest)
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → channel → HttpServer update loop → apply.rs
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - A rejected reload keeps the running configuration

pub mod apply;
pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use apply::{apply_manifest, ApplyReport};
pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{AppConfig, ListenerConfig, ObservabilityConfig, PageConfig, TranslationConfig};
