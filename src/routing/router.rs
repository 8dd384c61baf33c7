//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store compiled routes
//! - Look up matching route for a request path
//! - Return matched route or explicit RouteNotFound
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) path prefix scan (acceptable for typical route counts)
//! - Longest prefix wins; configuration order breaks ties
//! - Explicit RouteNotFound rather than silent default

use crate::error::GatewayError;
use crate::filter::FilterChain;
use crate::routing::matcher::PathPrefixMatcher;

/// A compiled route: prefix, target service and its filter chain.
#[derive(Debug, Clone)]
pub struct Route {
    pub id: String,
    pub matcher: PathPrefixMatcher,
    /// Logical backend service name.
    pub service: String,
    pub chain: FilterChain,
}

/// Immutable table of routes in configuration order.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// Find the route for `path`.
    pub fn match_path(&self, path: &str) -> Result<&Route, GatewayError> {
        let mut best: Option<&Route> = None;
        for route in &self.routes {
            if !route.matcher.matches(path) {
                continue;
            }
            // strictly longer only, so earlier routes win ties
            let longer = best
                .map(|b| route.matcher.prefix().len() > b.matcher.prefix().len())
                .unwrap_or(true);
            if longer {
                best = Some(route);
            }
        }
        best.ok_or_else(|| GatewayError::RouteNotFound {
            path: path.to_string(),
        })
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
