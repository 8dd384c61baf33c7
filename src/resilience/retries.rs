//! Retry filter.
//!
//! # Responsibilities
//! - Re-run the upstream call on backend failures (errors and 5xx)
//! - Wait a fixed backoff before each retry
//! - Surface the last failure once attempts are exhausted
//!
//! # Design Decisions
//! - At most `retries + 1` attempts per request
//! - Non-retryable errors (auth, body limits) propagate immediately
//! - The backoff sleep is async and dropped if the client goes away

use async_trait::async_trait;

use crate::config::RetryConfig;
use crate::error::GatewayError;
use crate::filter::{Filter, FilterResult, Next, RequestContext};
use crate::observability::metrics;
use crate::resilience::backoff::FixedBackoff;

#[derive(Debug, Clone)]
pub struct RetryFilter {
    service: String,
    retries: u32,
    backoff: FixedBackoff,
}

impl RetryFilter {
    pub fn new(service: impl Into<String>, config: &RetryConfig) -> Self {
        Self {
            service: service.into(),
            retries: config.retries,
            backoff: FixedBackoff::from_millis(config.backoff_ms),
        }
    }
}

#[async_trait]
impl Filter for RetryFilter {
    fn name(&self) -> &'static str {
        "retry"
    }

    async fn apply(&self, ctx: &mut RequestContext, next: Next<'_>) -> FilterResult {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;

            let failure = match next.run(ctx).await {
                Ok(response) if !response.status().is_server_error() => return Ok(response),
                Ok(response) => GatewayError::backend_unavailable(
                    &self.service,
                    format!("backend responded with {}", response.status()),
                ),
                Err(e) if e.is_retryable() => e,
                Err(e) => return Err(e),
            };

            if attempt > self.retries {
                tracing::warn!(
                    request_id = ?ctx.request_id,
                    service = %self.service,
                    attempts = attempt,
                    error = %failure,
                    "Retries exhausted"
                );
                return Err(failure.with_attempts(attempt));
            }

            let delay = self.backoff.delay(attempt);
            tracing::info!(
                request_id = ?ctx.request_id,
                service = %self.service,
                attempt = attempt,
                delay = ?delay,
                error = %failure,
                "Retrying request"
            );
            metrics::record_retry(&ctx.route_id);
            tokio::time::sleep(delay).await;
        }
    }
}
