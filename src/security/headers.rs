//! Header manipulation and CORS.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers on proxied requests and responses
//! - Add CORS response headers on every response, errors included
//! - Answer CORS preflight requests without reaching the backend
//!
//! # Design Decisions
//! - CORS values are configured per route and rendered once at startup
//! - CORS headers overwrite any the backend set, so clients see one policy

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use axum::response::Response;

use crate::config::CorsConfig;
use crate::filter::{Filter, FilterResult, Next, RequestContext};

/// Connection-scoped headers that must not be forwarded.
const HOP_BY_HOP: [HeaderName; 7] = [
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Remove hop-by-hop headers, including any listed in `Connection`.
///
/// Apply to client headers before any filter runs: a filter-added header
/// must never be removable by naming it in `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();
    for name in listed {
        headers.remove(name);
    }
    strip_fixed_hop_by_hop(headers);
}

/// Remove only the standard hop-by-hop headers.
pub fn strip_fixed_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
    headers.remove("keep-alive");
}

#[derive(Debug, Clone)]
pub struct CorsFilter {
    allow_origin: HeaderValue,
    allow_methods: HeaderValue,
    allow_headers: HeaderValue,
    handle_preflight: bool,
}

impl CorsFilter {
    pub fn new(config: &CorsConfig) -> Self {
        Self {
            allow_origin: header_value(&config.allowed_origins, "*"),
            allow_methods: header_value(&config.allowed_methods, "GET, POST, PUT, DELETE, OPTIONS"),
            allow_headers: header_value(&config.allowed_headers, "Authorization, Content-Type"),
            handle_preflight: config.handle_preflight,
        }
    }

    fn decorate(&self, headers: &mut HeaderMap) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, self.allow_origin.clone());
        headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, self.allow_methods.clone());
        headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, self.allow_headers.clone());
    }
}

fn header_value(configured: &str, fallback: &'static str) -> HeaderValue {
    HeaderValue::from_str(configured).unwrap_or_else(|_| {
        tracing::warn!(value = %configured, "Invalid CORS header value, using default");
        HeaderValue::from_static(fallback)
    })
}

#[async_trait]
impl Filter for CorsFilter {
    fn name(&self) -> &'static str {
        "cors"
    }

    async fn apply(&self, ctx: &mut RequestContext, next: Next<'_>) -> FilterResult {
        let preflight = ctx.method == Method::OPTIONS
            && ctx
                .inbound_headers
                .contains_key(header::ACCESS_CONTROL_REQUEST_METHOD);

        let mut response = if self.handle_preflight && preflight {
            let mut response = Response::new(Body::empty());
            *response.status_mut() = StatusCode::NO_CONTENT;
            response
        } else {
            next.run(ctx).await?
        };

        strip_hop_by_hop(response.headers_mut());
        self.decorate(response.headers_mut());
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::testing::{context, status, ScriptedEndpoint};
    use crate::filter::FilterChain;
    use std::sync::Arc;

    fn chain(config: CorsConfig, endpoint: Arc<ScriptedEndpoint>) -> FilterChain {
        FilterChain::new(vec![Arc::new(CorsFilter::new(&config))], endpoint)
    }

    #[tokio::test]
    async fn adds_default_headers() {
        let endpoint = Arc::new(ScriptedEndpoint::ok());
        let mut ctx = context("GET", "/videos/7", &[]);

        let response = chain(CorsConfig::default(), endpoint).run(&mut ctx).await.unwrap();

        let headers = response.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_METHODS],
            "GET, POST, PUT, DELETE, OPTIONS"
        );
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_HEADERS],
            "Authorization, Content-Type"
        );
    }

    #[tokio::test]
    async fn decorates_error_statuses_and_overrides_backend_values() {
        let mut backend = status(StatusCode::BAD_GATEWAY);
        backend.headers_mut().insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("https://evil.example"),
        );
        let endpoint = Arc::new(ScriptedEndpoint::new(vec![Ok(backend)]));
        let config = CorsConfig {
            allowed_origins: "https://app.example".into(),
            ..CorsConfig::default()
        };
        let mut ctx = context("GET", "/videos/7", &[]);

        let response = chain(config, endpoint).run(&mut ctx).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://app.example"
        );
    }

    #[tokio::test]
    async fn preflight_short_circuits() {
        let endpoint = Arc::new(ScriptedEndpoint::ok());
        let mut ctx = context(
            "OPTIONS",
            "/videos/7",
            &[("access-control-request-method", "DELETE")],
        );

        let response = chain(CorsConfig::default(), endpoint.clone())
            .run(&mut ctx)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(endpoint.calls(), 0);
    }

    #[test]
    fn strips_connection_listed_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive, x-secret"));
        headers.insert("keep-alive", HeaderValue::from_static("timeout=5"));
        headers.insert("x-secret", HeaderValue::from_static("1"));
        headers.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));

        strip_hop_by_hop(&mut headers);

        assert_eq!(headers.len(), 1);
        assert!(headers.contains_key(header::CONTENT_TYPE));
    }

    #[test]
    fn fixed_set_ignores_connection_listed_names() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONNECTION, HeaderValue::from_static("x-user-id"));
        headers.insert("x-user-id", HeaderValue::from_static("u-42"));
        headers.insert(header::UPGRADE, HeaderValue::from_static("websocket"));

        strip_fixed_hop_by_hop(&mut headers);

        assert_eq!(headers["x-user-id"], "u-42");
        assert!(headers.get(header::CONNECTION).is_none());
        assert!(headers.get(header::UPGRADE).is_none());
    }
}
