//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → compiled into the Gateway at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the route table never changes at runtime
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AccessLogConfig, AuthConfig, AuthFilterConfig, CorsConfig, ErrorConfig, FilterSettings,
    LimitsConfig, ListenerConfig, ObservabilityConfig, ProxyConfig, RequestIdConfig,
    RetryConfig, RouteConfig, RouteFilterOverrides, ServiceConfig, TimeoutConfig,
};
