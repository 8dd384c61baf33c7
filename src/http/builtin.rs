//! Endpoints served by the gateway itself.

use async_trait::async_trait;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::filter::{Endpoint, FilterResult, RequestContext};

pub const HEALTH_PATH: &str = "/health";
pub const ERROR_PATH: &str = "/error";

/// Liveness probe.
#[derive(Debug, Clone, Default)]
pub struct HealthEndpoint;

#[async_trait]
impl Endpoint for HealthEndpoint {
    async fn call(&self, _ctx: &mut RequestContext) -> FilterResult {
        Ok((StatusCode::OK, "API Gateway is running").into_response())
    }
}

/// Generic error page.
#[derive(Debug, Clone, Default)]
pub struct ErrorPageEndpoint;

#[async_trait]
impl Endpoint for ErrorPageEndpoint {
    async fn call(&self, ctx: &mut RequestContext) -> FilterResult {
        tracing::error!(request_id = ?ctx.request_id, "Error occurred");
        Ok((StatusCode::OK, "An error occurred").into_response())
    }
}
