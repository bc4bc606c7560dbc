//! Multi-tenant host routing and localized rendering engine.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod render;
pub mod routing;
pub mod site;

pub use config::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use site::{SiteRegistry, TenantHandler};
