//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, concurrency).
    pub listener: ListenerConfig,

    /// Route definitions mapping path prefixes to logical services.
    pub routes: Vec<RouteConfig>,

    /// Static service registry: logical name -> instances.
    pub services: BTreeMap<String, ServiceConfig>,

    /// Filter defaults applied to every route and to built-in endpoints.
    pub filters: FilterSettings,

    /// Bearer token verification settings.
    pub auth: AuthConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum in-flight requests across all connections. Excess requests
    /// wait for a slot; open connections are not capped.
    pub max_concurrent_requests: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_concurrent_requests: 10_000,
        }
    }
}

/// Route configuration mapping a path prefix to a logical service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Route identifier for logging/metrics.
    pub id: String,

    /// Path pattern, e.g. "/users/**" or "/users".
    pub path: String,

    /// Logical service name, e.g. "USER-SERVICE".
    pub service: String,

    /// Per-attempt upstream timeout override in milliseconds.
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    /// Per-route filter overrides.
    #[serde(default)]
    pub filters: RouteFilterOverrides,
}

/// Instances registered for one logical service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Instance addresses ("host:port").
    pub instances: Vec<String>,
}

/// Configuration for every filter the gateway knows about.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct FilterSettings {
    pub request_id: RequestIdConfig,
    pub cors: CorsConfig,
    pub authentication: AuthFilterConfig,
    pub retry: RetryConfig,
    pub errors: ErrorConfig,
    pub access_log: AccessLogConfig,
}

impl FilterSettings {
    /// Apply a route's overrides on top of these defaults.
    ///
    /// A present override replaces the whole block for that filter.
    pub fn merged(&self, overrides: &RouteFilterOverrides) -> FilterSettings {
        FilterSettings {
            request_id: overrides.request_id.clone().unwrap_or_else(|| self.request_id.clone()),
            cors: overrides.cors.clone().unwrap_or_else(|| self.cors.clone()),
            authentication: overrides
                .authentication
                .clone()
                .unwrap_or_else(|| self.authentication.clone()),
            retry: overrides.retry.clone().unwrap_or_else(|| self.retry.clone()),
            errors: overrides.errors.clone().unwrap_or_else(|| self.errors.clone()),
            access_log: overrides.access_log.clone().unwrap_or_else(|| self.access_log.clone()),
        }
    }
}

/// Per-route replacement blocks for [`FilterSettings`].
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouteFilterOverrides {
    pub request_id: Option<RequestIdConfig>,
    pub cors: Option<CorsConfig>,
    pub authentication: Option<AuthFilterConfig>,
    pub retry: Option<RetryConfig>,
    pub errors: Option<ErrorConfig>,
    pub access_log: Option<AccessLogConfig>,
}

/// Request correlation id handling.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RequestIdConfig {
    /// Generate a UUID when the client sent no X-Request-ID.
    pub generate_new_id: bool,
}

impl Default for RequestIdConfig {
    fn default() -> Self {
        Self { generate_new_id: true }
    }
}

/// CORS response headers.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    pub enabled: bool,
    pub allowed_origins: String,
    pub allowed_methods: String,
    pub allowed_headers: String,
    /// Answer OPTIONS preflight requests directly with 204.
    pub handle_preflight: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: "*".to_string(),
            allowed_methods: "GET, POST, PUT, DELETE, OPTIONS".to_string(),
            allowed_headers: "Authorization, Content-Type".to_string(),
            handle_preflight: true,
        }
    }
}

/// Per-route authentication toggle.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthFilterConfig {
    pub enabled: bool,
}

impl Default for AuthFilterConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Enable retries.
    pub enabled: bool,

    /// Additional attempts after the first one.
    pub retries: u32,

    /// Fixed delay before each retry in milliseconds.
    pub backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            retries: 3,
            backoff_ms: 2000,
        }
    }
}

/// Error translation settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ErrorConfig {
    /// Map error kinds to distinct statuses; otherwise everything is 500.
    pub classify_status: bool,

    /// Log translated failures at error level.
    pub log_failures: bool,
}

impl Default for ErrorConfig {
    fn default() -> Self {
        Self {
            classify_status: true,
            log_failures: true,
        }
    }
}

/// Access logging.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AccessLogConfig {
    pub enabled: bool,
}

impl Default for AccessLogConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Bearer token verification.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// JWS algorithm name (HS256, RS256, ES256, ...).
    pub algorithm: String,

    /// Shared secret for HMAC algorithms.
    pub secret: Option<String>,

    /// PEM public key for asymmetric algorithms.
    pub public_key_path: Option<String>,

    /// Expected `iss` claim.
    pub issuer: Option<String>,

    /// Expected `aud` claim.
    pub audience: Option<String>,

    /// Claim holding the subject id forwarded as X-User-Id.
    pub subject_claim: String,

    /// Paths that never require a token (exact match).
    pub public_paths: Vec<String>,

    /// Clock skew tolerance in seconds.
    pub leeway_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            algorithm: "HS256".to_string(),
            secret: None,
            public_key_path: None,
            issuer: None,
            audience: None,
            subject_claim: "sub".to_string(),
            public_paths: vec!["/login".to_string(), "/register".to_string()],
            leeway_secs: 30,
        }
    }
}

/// Timeout configuration for upstream calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in milliseconds.
    pub connect_ms: u64,

    /// Per-attempt upstream timeout in milliseconds.
    pub upstream_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_ms: 5_000,
            upstream_ms: 30_000,
        }
    }
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum buffered request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// "pretty" or "json".
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
