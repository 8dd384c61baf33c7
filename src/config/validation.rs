//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (routes reference registered services)
//! - Validate value ranges (timeouts > 0, body limit > 0)
//! - Detect conflicting routes (duplicate ids or prefixes)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{FilterSettings, ProxyConfig};
use crate::routing::matcher::normalize_pattern;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid bind address `{0}`")]
    InvalidBindAddress(String),

    #[error("route id must not be empty")]
    EmptyRouteId,

    #[error("duplicate route id `{0}`")]
    DuplicateRouteId(String),

    #[error("route `{route}` has invalid path `{path}` (must start with '/')")]
    InvalidPath { route: String, path: String },

    #[error("route `{route}` duplicates path prefix `{prefix}`")]
    DuplicatePathPrefix { route: String, prefix: String },

    #[error("route `{route}` targets unregistered service `{service}`")]
    UnknownService { route: String, service: String },

    #[error("service `{0}` has no instances")]
    EmptyService(String),

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),

    #[error("{0}: CORS allowed_origins must not be empty")]
    EmptyCorsOrigins(String),
}

/// Validate a parsed configuration, collecting every error found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if config.listener.max_concurrent_requests == 0 {
        errors.push(ValidationError::ZeroValue("listener.max_concurrent_requests"));
    }
    if config.timeouts.upstream_ms == 0 {
        errors.push(ValidationError::ZeroValue("timeouts.upstream_ms"));
    }
    if config.timeouts.connect_ms == 0 {
        errors.push(ValidationError::ZeroValue("timeouts.connect_ms"));
    }
    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroValue("limits.max_body_bytes"));
    }

    let registered: HashSet<String> = config
        .services
        .keys()
        .map(|name| name.to_ascii_uppercase())
        .collect();

    for (name, service) in &config.services {
        if service.instances.is_empty() {
            errors.push(ValidationError::EmptyService(name.clone()));
        }
    }

    check_filters("filters", &config.filters, &mut errors);

    let mut ids = HashSet::new();
    let mut prefixes = HashSet::new();
    for route in &config.routes {
        if route.id.trim().is_empty() {
            errors.push(ValidationError::EmptyRouteId);
        } else if !ids.insert(route.id.as_str()) {
            errors.push(ValidationError::DuplicateRouteId(route.id.clone()));
        }

        if !route.path.starts_with('/') {
            errors.push(ValidationError::InvalidPath {
                route: route.id.clone(),
                path: route.path.clone(),
            });
        } else {
            let prefix = normalize_pattern(&route.path);
            if !prefixes.insert(prefix.clone()) {
                errors.push(ValidationError::DuplicatePathPrefix {
                    route: route.id.clone(),
                    prefix,
                });
            }
        }

        if !registered.contains(&route.service.to_ascii_uppercase()) {
            errors.push(ValidationError::UnknownService {
                route: route.id.clone(),
                service: route.service.clone(),
            });
        }

        if route.timeout_ms == Some(0) {
            errors.push(ValidationError::ZeroValue("routes.timeout_ms"));
        }

        let merged = config.filters.merged(&route.filters);
        check_filters(&format!("route `{}`", route.id), &merged, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_filters(scope: &str, filters: &FilterSettings, errors: &mut Vec<ValidationError>) {
    if filters.cors.enabled && filters.cors.allowed_origins.trim().is_empty() {
        let err = ValidationError::EmptyCorsOrigins(scope.to_string());
        if !errors.contains(&err) {
            errors.push(err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{RouteConfig, ServiceConfig};

    fn route(id: &str, path: &str, service: &str) -> RouteConfig {
        RouteConfig {
            id: id.into(),
            path: path.into(),
            service: service.into(),
            timeout_ms: None,
            filters: Default::default(),
        }
    }

    fn service(addr: &str) -> ServiceConfig {
        ServiceConfig {
            instances: vec![addr.into()],
        }
    }

    #[test]
    fn accepts_well_formed_config() {
        let mut config = ProxyConfig::default();
        config.services.insert("USER-SERVICE".into(), service("127.0.0.1:9001"));
        config.routes.push(route("users", "/users/**", "user-service"));
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn rejects_zero_request_limit() {
        let mut config = ProxyConfig::default();
        config.listener.max_concurrent_requests = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::ZeroValue("listener.max_concurrent_requests")]
        );
    }

    #[test]
    fn collects_every_error() {
        let mut config = ProxyConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.services.insert("EMPTY".into(), ServiceConfig::default());
        config.services.insert("USER-SERVICE".into(), service("127.0.0.1:9001"));
        config.routes.push(route("users", "/users/**", "USER-SERVICE"));
        config.routes.push(route("users", "/users", "USER-SERVICE"));
        config.routes.push(route("videos", "videos", "VIDEO-SERVICE"));

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::InvalidBindAddress("not-an-address".into())));
        assert!(errors.contains(&ValidationError::EmptyService("EMPTY".into())));
        assert!(errors.contains(&ValidationError::DuplicateRouteId("users".into())));
        assert!(errors.contains(&ValidationError::DuplicatePathPrefix {
            route: "users".into(),
            prefix: "/users".into(),
        }));
        assert!(errors.contains(&ValidationError::InvalidPath {
            route: "videos".into(),
            path: "videos".into(),
        }));
        assert!(errors.contains(&ValidationError::UnknownService {
            route: "videos".into(),
            service: "VIDEO-SERVICE".into(),
        }));
    }

    #[test]
    fn rejects_empty_cors_origin() {
        let mut config = ProxyConfig::default();
        config.filters.cors.allowed_origins = " ".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::EmptyCorsOrigins("filters".into())]);
    }
}
