//! Filter chain engine.
//!
//! # Data Flow
//! ```text
//! RequestContext
//!     → filter[0].apply(ctx, next)
//!         → filter[1].apply(ctx, next)
//!             → ...
//!                 → endpoint.call(ctx)        (proxy, built-in, rejection)
//!             ← Result<Response, GatewayError>
//!         ← post-processing in reverse order
//! ```
//!
//! # Design Decisions
//! - Filters are trait objects composed by an explicit `Next` continuation
//! - A filter may short-circuit, call `next` once, or call it repeatedly (retry)
//! - Chains are built once per route and shared read-only across requests
//! - Failures are values; only the error-translation filter renders them

pub mod context;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use axum::response::Response;

use crate::error::GatewayError;

pub use context::{AuthenticatedPrincipal, RequestContext};

/// Outcome of a filter or endpoint.
pub type FilterResult = Result<Response, GatewayError>;

/// A composable request/response interceptor.
#[async_trait]
pub trait Filter: Send + Sync + fmt::Debug {
    /// Short name used in logs and chain descriptions.
    fn name(&self) -> &'static str;

    async fn apply(&self, ctx: &mut RequestContext, next: Next<'_>) -> FilterResult;
}

/// Terminal action of a chain.
#[async_trait]
pub trait Endpoint: Send + Sync + fmt::Debug {
    async fn call(&self, ctx: &mut RequestContext) -> FilterResult;
}

/// The remainder of a chain, handed to each filter.
///
/// `Next` is `Copy`, so a filter can run the rest of the chain more than once.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    filters: &'a [Arc<dyn Filter>],
    endpoint: &'a dyn Endpoint,
}

impl<'a> Next<'a> {
    pub fn new(filters: &'a [Arc<dyn Filter>], endpoint: &'a dyn Endpoint) -> Self {
        Self { filters, endpoint }
    }

    /// Run the remaining filters and then the endpoint.
    pub async fn run(self, ctx: &mut RequestContext) -> FilterResult {
        match self.filters.split_first() {
            Some((filter, rest)) => {
                filter
                    .apply(ctx, Next { filters: rest, endpoint: self.endpoint })
                    .await
            }
            None => self.endpoint.call(ctx).await,
        }
    }
}

/// An ordered list of filters wrapping one endpoint.
#[derive(Debug, Clone)]
pub struct FilterChain {
    filters: Vec<Arc<dyn Filter>>,
    endpoint: Arc<dyn Endpoint>,
}

impl FilterChain {
    /// Filters are given outermost first.
    pub fn new(filters: Vec<Arc<dyn Filter>>, endpoint: Arc<dyn Endpoint>) -> Self {
        Self { filters, endpoint }
    }

    pub async fn run(&self, ctx: &mut RequestContext) -> FilterResult {
        Next::new(&self.filters, self.endpoint.as_ref()).run(ctx).await
    }

    pub fn filter_names(&self) -> Vec<&'static str> {
        self.filters.iter().map(|f| f.name()).collect()
    }
}

/// Endpoint that fails every request with a fixed error.
#[derive(Debug, Clone)]
pub struct RejectEndpoint(pub GatewayError);

#[async_trait]
impl Endpoint for RejectEndpoint {
    async fn call(&self, _ctx: &mut RequestContext) -> FilterResult {
        Err(self.0.clone())
    }
}
