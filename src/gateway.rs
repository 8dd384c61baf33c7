//! Request dispatch: compiled routes plus the global filter set.
//!
//! # Responsibilities
//! - Compile configuration into one filter chain per route
//! - Buffer the inbound body under the size limit
//! - Select a route (or a built-in endpoint) and run its chain
//! - Guarantee every request ends in a response
//!
//! # Data Flow
//! ```text
//! Request<Body>
//!     → read_body (PayloadTooLarge on overflow)
//!     → RequestContext
//!     → /health, /error      → global filters → built-in endpoint
//!     → RouteTable::match    → route chain    → ProxyEndpoint
//!     → no match / bad body  → global filters → RejectEndpoint
//!     → Response (last-resort translation if an error escapes)
//!     → request metrics, whatever filters are enabled
//! ```
//!
//! # Design Decisions
//! - Chains are built once and never mutated, so dispatch needs no locks
//! - Rejections still pass through access log, request id, CORS and error translation

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{Method, Request};
use axum::response::Response;

use crate::config::{ConfigError, FilterSettings, ProxyConfig};
use crate::discovery::{ServiceResolver, StaticResolver};
use crate::filter::context::read_body;
use crate::filter::{Endpoint, Filter, FilterChain, Next, RejectEndpoint, RequestContext};
use crate::http::builtin::{ErrorPageEndpoint, HealthEndpoint, ERROR_PATH, HEALTH_PATH};
use crate::http::proxy::{build_client, ProxyEndpoint, UpstreamClient};
use crate::http::request::RequestIdFilter;
use crate::http::response::ErrorTranslationFilter;
use crate::observability::{metrics, AccessLogFilter};
use crate::resilience::RetryFilter;
use crate::routing::matcher::PathPrefixMatcher;
use crate::routing::{Route, RouteTable};
use crate::security::auth::AuthenticationFilter;
use crate::security::headers::CorsFilter;
use crate::security::jwt::{JwtVerifier, TokenVerifier};

const BUILTIN_ROUTE: &str = "builtin";
const UNROUTED: &str = "none";

/// Everything needed to serve a request, built once at startup.
#[derive(Debug)]
pub struct Gateway {
    routes: RouteTable,
    global_filters: Vec<Arc<dyn Filter>>,
    health: HealthEndpoint,
    error_page: ErrorPageEndpoint,
    last_resort: ErrorTranslationFilter,
    max_body_bytes: usize,
}

impl Gateway {
    /// Build from configuration with the static registry and the configured verifier.
    pub fn from_config(config: &ProxyConfig) -> Result<Self, ConfigError> {
        let resolver: Arc<dyn ServiceResolver> = Arc::new(StaticResolver::new(&config.services));
        let verifier = JwtVerifier::from_config(&config.auth)?
            .map(|v| Arc::new(v) as Arc<dyn TokenVerifier>);
        let client = build_client(&config.timeouts);
        Self::new(config, resolver, verifier, client)
    }

    /// Build with explicit collaborators.
    ///
    /// Fails when a route enables authentication but no verifier is available.
    pub fn new(
        config: &ProxyConfig,
        resolver: Arc<dyn ServiceResolver>,
        verifier: Option<Arc<dyn TokenVerifier>>,
        client: UpstreamClient,
    ) -> Result<Self, ConfigError> {
        let mut routes = Vec::with_capacity(config.routes.len());

        for route in &config.routes {
            let settings = config.filters.merged(&route.filters);
            let mut filters = global_filters(&settings);

            if settings.authentication.enabled {
                let verifier = verifier.clone().ok_or_else(|| {
                    ConfigError::Verifier(format!(
                        "route `{}` requires authentication but no [auth] key is configured",
                        route.id
                    ))
                })?;
                filters.push(Arc::new(AuthenticationFilter::new(verifier, &config.auth)));
            }
            if settings.retry.enabled {
                filters.push(Arc::new(RetryFilter::new(&route.service, &settings.retry)));
            }

            let attempt_timeout =
                Duration::from_millis(route.timeout_ms.unwrap_or(config.timeouts.upstream_ms));
            let endpoint: Arc<dyn Endpoint> = Arc::new(ProxyEndpoint::new(
                &route.service,
                resolver.clone(),
                client.clone(),
                attempt_timeout,
            ));
            let chain = FilterChain::new(filters, endpoint);

            tracing::debug!(
                route = %route.id,
                path = %route.path,
                service = %route.service,
                filters = ?chain.filter_names(),
                "Route compiled"
            );

            routes.push(Route {
                id: route.id.clone(),
                matcher: PathPrefixMatcher::new(&route.path),
                service: route.service.clone(),
                chain,
            });
        }

        tracing::info!(routes = routes.len(), "Gateway routes loaded");

        Ok(Self {
            routes: RouteTable::new(routes),
            global_filters: global_filters(&config.filters),
            health: HealthEndpoint,
            error_page: ErrorPageEndpoint,
            last_resort: ErrorTranslationFilter::new(&config.filters.errors),
            max_body_bytes: config.limits.max_body_bytes,
        })
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Serve one request. Never fails: every error becomes a response.
    pub async fn handle(&self, request: Request<Body>, client_addr: Option<SocketAddr>) -> Response {
        let (parts, body) = request.into_parts();
        let (bytes, body_error) = match read_body(body, self.max_body_bytes).await {
            Ok(bytes) => (bytes, None),
            Err(e) => (Bytes::new(), Some(e)),
        };
        let mut ctx = RequestContext::new(Request::from_parts(parts, bytes), client_addr);

        let result = if let Some(err) = body_error {
            ctx.route_id = UNROUTED.to_string();
            self.run_global(&RejectEndpoint(err), &mut ctx).await
        } else if let Some(builtin) = self.builtin_for(&ctx) {
            ctx.route_id = BUILTIN_ROUTE.to_string();
            self.run_global(builtin, &mut ctx).await
        } else {
            match self.routes.match_path(ctx.path()) {
                Ok(route) => {
                    ctx.route_id = route.id.clone();
                    ctx.service = Some(route.service.clone());
                    route.chain.run(&mut ctx).await
                }
                Err(err) => {
                    ctx.route_id = UNROUTED.to_string();
                    self.run_global(&RejectEndpoint(err), &mut ctx).await
                }
            }
        };

        let response = match result {
            Ok(response) => response,
            Err(err) => self.last_resort.translate(&mut ctx, err),
        };
        metrics::record_request(
            ctx.method.as_str(),
            response.status().as_u16(),
            &ctx.route_id,
            ctx.started_at,
        );
        response
    }

    async fn run_global(
        &self,
        endpoint: &dyn Endpoint,
        ctx: &mut RequestContext,
    ) -> crate::filter::FilterResult {
        Next::new(&self.global_filters, endpoint).run(ctx).await
    }

    fn builtin_for(&self, ctx: &RequestContext) -> Option<&dyn Endpoint> {
        if ctx.method != Method::GET && ctx.method != Method::HEAD {
            return None;
        }
        match ctx.path() {
            HEALTH_PATH => Some(&self.health),
            ERROR_PATH => Some(&self.error_page),
            _ => None,
        }
    }
}

/// Filters every request passes through, outermost first.
fn global_filters(settings: &FilterSettings) -> Vec<Arc<dyn Filter>> {
    let mut filters: Vec<Arc<dyn Filter>> = Vec::new();
    if settings.access_log.enabled {
        filters.push(Arc::new(AccessLogFilter));
    }
    filters.push(Arc::new(RequestIdFilter::new(&settings.request_id)));
    if settings.cors.enabled {
        filters.push(Arc::new(CorsFilter::new(&settings.cors)));
    }
    filters.push(Arc::new(ErrorTranslationFilter::new(&settings.errors)));
    filters
}
