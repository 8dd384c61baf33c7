//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with a single catch-all handler
//! - Wire up tower middleware (tracing, concurrency limit)
//! - Bind server to listener and drain on shutdown
//! - Hand every request to the [`Gateway`]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    response::Response,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::limit::ConcurrencyLimitLayer;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::{ConfigError, ProxyConfig};
use crate::gateway::Gateway;

/// HTTP front end of the gateway.
pub struct HttpServer {
    router: Router,
    gateway: Arc<Gateway>,
}

impl HttpServer {
    /// Build the gateway from configuration and wrap it in a server.
    pub fn new(config: &ProxyConfig) -> Result<Self, ConfigError> {
        let gateway = Arc::new(Gateway::from_config(config)?);
        Ok(Self::with_gateway(config, gateway))
    }

    /// Serve an already-built gateway.
    pub fn with_gateway(config: &ProxyConfig, gateway: Arc<Gateway>) -> Self {
        let router = Self::build_router(config, gateway.clone());
        Self { router, gateway }
    }

    fn build_router(config: &ProxyConfig, gateway: Arc<Gateway>) -> Router {
        Router::new()
            .fallback(gateway_handler)
            .with_state(gateway)
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(ConcurrencyLimitLayer::new(config.listener.max_concurrent_requests)),
            )
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.gateway.routes().len(),
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn gateway_handler(
    State(gateway): State<Arc<Gateway>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    gateway.handle(request, Some(addr)).await
}
