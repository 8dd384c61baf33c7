//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path)
//!     → router.rs (route lookup)
//!     → matcher.rs (segment-aware prefix match)
//!     → Return: matched Route or RouteNotFound
//!
//! Route Compilation (at startup):
//!     RouteConfig[]
//!     → Normalize path patterns
//!     → Build each route's filter chain
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always matches same route

pub mod matcher;
pub mod router;

pub use router::{Route, RouteTable};
