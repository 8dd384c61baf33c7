//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, tower layers)
//!     → gateway (route selection, filter chain)
//!     → request.rs (request id)
//!     → response.rs (error envelope)
//!     → proxy.rs (forward to a service instance)
//!     → builtin.rs (/health, /error)
//!     → Send to client
//! ```

pub mod builtin;
pub mod proxy;
pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestIdFilter, X_REQUEST_ID};
pub use response::{ErrorEnvelope, ErrorTranslationFilter};
pub use server::HttpServer;
