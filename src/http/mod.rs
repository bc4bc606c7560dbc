//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, host extraction)
//!     → dispatch.rs (tenant resolution, language negotiation, table lookup)
//!     → response.rs (headers, status)
//!     → Send to client
//! ```

pub mod dispatch;
pub mod language;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
