//! Filter-chain API gateway library.

// Core subsystems
pub mod config;
pub mod discovery;
pub mod error;
pub mod filter;
pub mod gateway;
pub mod http;
pub mod routing;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod security;

pub use config::schema::ProxyConfig;
pub use error::{ErrorKind, GatewayError};
pub use gateway::Gateway;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
