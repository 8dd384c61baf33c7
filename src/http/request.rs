//! Request correlation ids.
//!
//! # Responsibilities
//! - Reuse the client's X-Request-ID or generate a UUID v4
//! - Forward the id to the backend and echo it on the response
//! - Expose the id on the context for the access log
//!
//! # Design Decisions
//! - An existing id is never overwritten, so retries within one request
//!   and repeated client submissions keep the same id
//! - The id is set before authentication and retry run

use async_trait::async_trait;
use axum::http::HeaderValue;
use uuid::Uuid;

use crate::config::RequestIdConfig;
use crate::filter::{Filter, FilterResult, Next, RequestContext};

/// Correlation header name.
pub const X_REQUEST_ID: &str = "x-request-id";

#[derive(Debug, Clone)]
pub struct RequestIdFilter {
    generate_new_id: bool,
}

impl RequestIdFilter {
    pub fn new(config: &RequestIdConfig) -> Self {
        Self {
            generate_new_id: config.generate_new_id,
        }
    }
}

#[async_trait]
impl Filter for RequestIdFilter {
    fn name(&self) -> &'static str {
        "request_id"
    }

    async fn apply(&self, ctx: &mut RequestContext, next: Next<'_>) -> FilterResult {
        let request_id = match ctx.inbound_header(X_REQUEST_ID) {
            Some(existing) if !existing.is_empty() => Some(existing.to_string()),
            _ if self.generate_new_id => Some(Uuid::new_v4().to_string()),
            _ => None,
        };

        let header = request_id
            .as_deref()
            .and_then(|id| HeaderValue::from_str(id).ok());
        if let Some(value) = &header {
            ctx.headers.insert(X_REQUEST_ID, value.clone());
        }
        ctx.request_id = request_id;

        let mut response = next.run(ctx).await?;
        if let Some(value) = header {
            response.headers_mut().insert(X_REQUEST_ID, value);
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::testing::{context, ScriptedEndpoint};
    use crate::filter::FilterChain;
    use std::sync::Arc;

    fn chain(generate: bool, endpoint: Arc<ScriptedEndpoint>) -> FilterChain {
        let filter = RequestIdFilter::new(&RequestIdConfig { generate_new_id: generate });
        FilterChain::new(vec![Arc::new(filter)], endpoint)
    }

    #[tokio::test]
    async fn generates_id_when_absent() {
        let endpoint = Arc::new(ScriptedEndpoint::ok());
        let mut ctx = context("GET", "/users/42", &[]);

        let response = chain(true, endpoint.clone()).run(&mut ctx).await.unwrap();

        let id = ctx.request_id.clone().unwrap();
        assert!(Uuid::parse_str(&id).is_ok());
        assert_eq!(response.headers()[X_REQUEST_ID], id.as_str());
        assert_eq!(endpoint.seen_headers.lock().unwrap()[0][X_REQUEST_ID], id.as_str());
    }

    #[tokio::test]
    async fn preserves_existing_id_across_requests() {
        let endpoint = Arc::new(ScriptedEndpoint::ok());
        let chain = chain(true, endpoint.clone());

        for _ in 0..2 {
            let mut ctx = context("GET", "/users/42", &[(X_REQUEST_ID, "req-123")]);
            let response = chain.run(&mut ctx).await.unwrap();
            assert_eq!(response.headers()[X_REQUEST_ID], "req-123");
        }

        let seen = endpoint.seen_headers.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen.iter().all(|h| h[X_REQUEST_ID] == "req-123"));
    }

    #[tokio::test]
    async fn generation_can_be_disabled() {
        let endpoint = Arc::new(ScriptedEndpoint::ok());
        let mut ctx = context("GET", "/users/42", &[]);

        let response = chain(false, endpoint.clone()).run(&mut ctx).await.unwrap();

        assert!(ctx.request_id.is_none());
        assert!(response.headers().get(X_REQUEST_ID).is_none());
        assert!(endpoint.seen_headers.lock().unwrap()[0].get(X_REQUEST_ID).is_none());
    }
}
