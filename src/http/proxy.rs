//! Upstream forwarding: the terminal endpoint of every routed chain.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Response;
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::config::TimeoutConfig;
use crate::discovery::ServiceResolver;
use crate::error::GatewayError;
use crate::filter::{Endpoint, FilterResult, RequestContext};
use crate::resilience::timeouts;

/// Pooled HTTP/1.1 client shared by all routes.
pub type UpstreamClient = Client<HttpConnector, Body>;

pub fn build_client(timeouts: &TimeoutConfig) -> UpstreamClient {
    let mut connector = HttpConnector::new();
    connector.set_connect_timeout(Some(Duration::from_millis(timeouts.connect_ms)));
    Client::builder(TokioExecutor::new()).build(connector)
}

/// Forwards the request to one instance of a logical service.
#[derive(Debug, Clone)]
pub struct ProxyEndpoint {
    service: String,
    resolver: Arc<dyn ServiceResolver>,
    client: UpstreamClient,
    attempt_timeout: Duration,
}

impl ProxyEndpoint {
    pub fn new(
        service: impl Into<String>,
        resolver: Arc<dyn ServiceResolver>,
        client: UpstreamClient,
        attempt_timeout: Duration,
    ) -> Self {
        Self {
            service: service.into(),
            resolver,
            client,
            attempt_timeout,
        }
    }
}

#[async_trait]
impl Endpoint for ProxyEndpoint {
    async fn call(&self, ctx: &mut RequestContext) -> FilterResult {
        let authority = self.resolver.resolve(&self.service).ok_or_else(|| {
            GatewayError::backend_unavailable(&self.service, "no instances registered")
        })?;
        let request = ctx.upstream_request(&authority)?;

        tracing::debug!(
            request_id = ?ctx.request_id,
            service = %self.service,
            upstream = %authority,
            method = %ctx.method,
            path = %ctx.path(),
            "Proxying request"
        );

        let response: Response<Incoming> =
            timeouts::within(self.attempt_timeout, &self.service, self.client.request(request))
                .await?
                .map_err(|e| {
                    tracing::warn!(
                        request_id = ?ctx.request_id,
                        upstream = %authority,
                        error = %e,
                        "Upstream error"
                    );
                    GatewayError::backend_unavailable(&self.service, e.to_string())
                })?;

        let (parts, body) = response.into_parts();
        Ok(Response::from_parts(parts, Body::new(body)))
    }
}
