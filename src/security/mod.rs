//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → headers.rs (CORS, hop-by-hop header stripping)
//!     → auth.rs (bearer token → X-User-Id)
//!         → jwt.rs (signature and claim validation)
//!     → Pass to retry / proxy
//! ```
//!
//! # Design Decisions
//! - Fail closed: a missing or invalid token never reaches a backend
//! - No trust in client input: inbound X-User-Id is always dropped

pub mod auth;
pub mod headers;
pub mod jwt;

pub use auth::AuthenticationFilter;
pub use headers::CorsFilter;
pub use jwt::{JwtVerifier, TokenVerifier};
