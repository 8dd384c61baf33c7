//! Access log filter. Side effects only; never alters the response.
//!
//! Request metrics are recorded by the gateway itself, so they keep
//! flowing when this filter is disabled.

use async_trait::async_trait;

use crate::filter::{Filter, FilterResult, Next, RequestContext};

#[derive(Debug, Clone, Default)]
pub struct AccessLogFilter;

#[async_trait]
impl Filter for AccessLogFilter {
    fn name(&self) -> &'static str {
        "access_log"
    }

    async fn apply(&self, ctx: &mut RequestContext, next: Next<'_>) -> FilterResult {
        let result = next.run(ctx).await;

        let status = match &result {
            Ok(response) => response.status(),
            Err(e) => e.kind().status(),
        };
        let latency = ctx.started_at.elapsed();

        tracing::info!(
            target: "stream_gateway::access",
            method = %ctx.method,
            path = %ctx.path(),
            status = status.as_u16(),
            latency_ms = latency.as_millis() as u64,
            request_id = ctx.request_id.as_deref().unwrap_or("-"),
            route = %ctx.route_id,
            service = ctx.service.as_deref().unwrap_or("-"),
            user = ctx.forwarded_user.as_deref().unwrap_or("-"),
            error = ctx.error.map(|k| k.as_str()).unwrap_or("-"),
            "Request completed"
        );

        result
    }
}
