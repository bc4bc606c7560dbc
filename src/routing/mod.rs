//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (Host header)
//!     → matcher.rs (strip port, normalise)
//!     → snapshot of tenant handlers (site::SiteRegistry::list)
//!     → matcher.rs (exact match, else longest wildcard)
//!     → Return: owning tenant or None (fallback response)
//! ```
//!
//! # Design Decisions
//! - Domain patterns compiled when a tenant is set, not per request
//! - No regex in hot path (suffix comparison only)
//! - Deterministic: same host and tenant set always pick the same tenant

pub mod matcher;

pub use matcher::{DomainError, DomainPattern};
