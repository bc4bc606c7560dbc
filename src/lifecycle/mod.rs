//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Init logging/metrics → Build registry → Apply manifest
//!     → Start watcher (optional) → Bind listener → Serve
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C → broadcast → server drains, update loop stops → Exit
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then sites, then listener
//! - Tenants are fully rendered before the listener accepts traffic
//! - Fail fast: any startup error is fatal

pub mod shutdown;
pub mod startup;

pub use shutdown::Shutdown;
