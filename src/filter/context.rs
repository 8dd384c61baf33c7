//! Per-request state threaded through the filter chain.

use std::net::SocketAddr;
use std::time::Instant;

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderValue, Method, Request, Uri, Version};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use serde_json::{Map, Value};

use crate::error::{ErrorKind, GatewayError};
use crate::security::headers::{strip_fixed_hop_by_hop, strip_hop_by_hop};

/// Header carrying the forwarded identity.
pub const X_USER_ID: &str = "x-user-id";

/// Header appended with the client address on proxied requests.
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Verified identity derived from a bearer token.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedPrincipal {
    pub subject_id: String,
    pub raw_claims: Map<String, Value>,
}

impl AuthenticatedPrincipal {
    /// Build a principal from verified claims, reading the subject from
    /// `subject_claim`. String and numeric claims are accepted.
    pub fn from_claims(
        raw_claims: Map<String, Value>,
        subject_claim: &str,
    ) -> Result<Self, GatewayError> {
        let subject_id = match raw_claims.get(subject_claim) {
            Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => {
                return Err(GatewayError::AuthClaimMissing(format!(
                    "Token has no `{}` claim",
                    subject_claim
                )))
            }
        };
        Ok(Self { subject_id, raw_claims })
    }
}

/// Mutable bag owned by one in-flight request.
#[derive(Debug)]
pub struct RequestContext {
    /// Original request method.
    pub method: Method,
    /// Original request URI.
    pub uri: Uri,
    pub version: Version,
    /// Headers exactly as received from the client.
    pub inbound_headers: HeaderMap,
    /// Headers that will be sent to the backend, hop-by-hop headers removed.
    pub headers: HeaderMap,
    /// Buffered request body, replayed on every upstream attempt.
    pub body: Bytes,
    pub client_addr: Option<SocketAddr>,
    /// Id of the matched route ("none" when nothing matched).
    pub route_id: String,
    /// Logical service of the matched route.
    pub service: Option<String>,
    pub request_id: Option<String>,
    pub principal: Option<AuthenticatedPrincipal>,
    pub forwarded_user: Option<String>,
    /// Kind of the failure translated for this request, if any.
    pub error: Option<ErrorKind>,
    pub started_at: Instant,
}

impl RequestContext {
    pub fn new(request: Request<Bytes>, client_addr: Option<SocketAddr>) -> Self {
        let (parts, body) = request.into_parts();
        let mut headers = parts.headers.clone();
        strip_hop_by_hop(&mut headers);
        Self {
            method: parts.method,
            uri: parts.uri,
            version: parts.version,
            headers,
            inbound_headers: parts.headers,
            body,
            client_addr,
            route_id: "none".to_string(),
            service: None,
            request_id: None,
            principal: None,
            forwarded_user: None,
            error: None,
            started_at: Instant::now(),
        }
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// First value of an inbound header, if it is valid visible ASCII.
    pub fn inbound_header(&self, name: &str) -> Option<&str> {
        self.inbound_headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Build the request sent to one backend instance.
    ///
    /// Path and query are forwarded unchanged. `Host` and the standard
    /// hop-by-hop headers are dropped and the client address is appended to
    /// X-Forwarded-For. Connection-listed headers were already removed in
    /// [`RequestContext::new`].
    pub fn upstream_request(&self, authority: &str) -> Result<Request<Body>, GatewayError> {
        let path_and_query = self
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        let uri: Uri = format!("http://{}{}", authority, path_and_query)
            .parse()
            .map_err(|e| GatewayError::Unexpected(format!("Invalid upstream URI: {}", e)))?;

        let mut headers = self.headers.clone();
        headers.remove(header::HOST);
        strip_fixed_hop_by_hop(&mut headers);

        if let Some(addr) = self.client_addr {
            let forwarded = match headers.get(X_FORWARDED_FOR).and_then(|v| v.to_str().ok()) {
                Some(existing) => format!("{}, {}", existing, addr.ip()),
                None => addr.ip().to_string(),
            };
            if let Ok(value) = HeaderValue::from_str(&forwarded) {
                headers.insert(X_FORWARDED_FOR, value);
            }
        }

        let mut request = Request::new(Body::from(self.body.clone()));
        *request.method_mut() = self.method.clone();
        *request.uri_mut() = uri;
        *request.headers_mut() = headers;
        Ok(request)
    }
}

/// Buffer an inbound body, enforcing `limit` bytes.
pub async fn read_body(body: Body, limit: usize) -> Result<Bytes, GatewayError> {
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            Err(GatewayError::PayloadTooLarge { limit })
        }
        Err(e) => Err(GatewayError::Unexpected(format!(
            "Failed to read request body: {}",
            e
        ))),
    }
}
