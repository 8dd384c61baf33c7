//! Service discovery seam.
//!
//! # Data Flow
//! ```text
//! Route matched → logical service name ("USER-SERVICE")
//!     → ServiceResolver::resolve
//!     → "host:port" of one instance, or None
//! ```
//!
//! # Design Decisions
//! - Discovery is an injected collaborator; the gateway only consumes names
//! - Logical names are case-insensitive
//! - The bundled static resolver rotates instances round-robin

pub mod round_robin;

pub use round_robin::StaticResolver;

/// Resolves a logical service name to a network address.
pub trait ServiceResolver: Send + Sync + std::fmt::Debug {
    /// Return one instance address ("host:port") for `service`.
    fn resolve(&self, service: &str) -> Option<String>;
}
