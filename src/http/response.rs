//! Error translation.
//!
//! # Responsibilities
//! - Catch every failure escaping the inner chain
//! - Render it as a JSON error envelope with a status
//! - Record the failure kind on the context for the access log
//!
//! # Design Decisions
//! - The only place a JSON error body is produced
//! - Statuses are classified by kind unless configured to flatten to 500
//! - Failure details go to the log, never a backtrace to the client

use async_trait::async_trait;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::config::ErrorConfig;
use crate::error::GatewayError;
use crate::filter::{Filter, FilterResult, Next, RequestContext};

/// Uniform body returned on failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct ErrorTranslationFilter {
    classify_status: bool,
    log_failures: bool,
}

impl ErrorTranslationFilter {
    pub fn new(config: &ErrorConfig) -> Self {
        Self {
            classify_status: config.classify_status,
            log_failures: config.log_failures,
        }
    }

    pub fn status_for(&self, err: &GatewayError) -> StatusCode {
        if self.classify_status {
            err.kind().status()
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    /// Render `err` and record its kind on the context.
    pub fn translate(&self, ctx: &mut RequestContext, err: GatewayError) -> Response {
        let status = self.status_for(&err);
        ctx.error = Some(err.kind());

        if self.log_failures {
            tracing::error!(
                request_id = ?ctx.request_id,
                route = %ctx.route_id,
                kind = %err.kind(),
                status = status.as_u16(),
                error = %err,
                "Request failed"
            );
        } else {
            tracing::debug!(
                request_id = ?ctx.request_id,
                kind = %err.kind(),
                error = %err,
                "Request failed"
            );
        }

        let envelope = ErrorEnvelope {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: err.to_string(),
        };
        (status, Json(envelope)).into_response()
    }
}

#[async_trait]
impl Filter for ErrorTranslationFilter {
    fn name(&self) -> &'static str {
        "error_translation"
    }

    async fn apply(&self, ctx: &mut RequestContext, next: Next<'_>) -> FilterResult {
        match next.run(ctx).await {
            Ok(response) => Ok(response),
            Err(err) => Ok(self.translate(ctx, err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::filter::testing::{context, ScriptedEndpoint};
    use crate::filter::FilterChain;
    use axum::http::header;
    use http_body_util::BodyExt;
    use std::sync::Arc;

    async fn run(config: ErrorConfig, outcome: FilterResult) -> (Response, RequestContext) {
        let endpoint = Arc::new(ScriptedEndpoint::new(vec![outcome]));
        let chain = FilterChain::new(vec![Arc::new(ErrorTranslationFilter::new(&config))], endpoint);
        let mut ctx = context("GET", "/users/42", &[]);
        let response = chain.run(&mut ctx).await.unwrap();
        (response, ctx)
    }

    async fn envelope(response: Response) -> ErrorEnvelope {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn classifies_by_kind() {
        let cases = [
            (GatewayError::RouteNotFound { path: "/x".into() }, StatusCode::NOT_FOUND, "Not Found"),
            (GatewayError::AuthClaimMissing("Missing bearer token".into()), StatusCode::UNAUTHORIZED, "Unauthorized"),
            (GatewayError::backend_unavailable("USER-SERVICE", "refused"), StatusCode::BAD_GATEWAY, "Bad Gateway"),
            (GatewayError::Unexpected("boom".into()), StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"),
        ];

        for (err, expected_status, expected_error) in cases {
            let message = err.to_string();
            let (response, ctx) = run(ErrorConfig::default(), Err(err)).await;

            assert_eq!(response.status(), expected_status);
            assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
            assert!(ctx.error.is_some());
            assert_eq!(
                envelope(response).await,
                ErrorEnvelope {
                    error: expected_error.into(),
                    message,
                }
            );
        }
    }

    #[tokio::test]
    async fn unclassified_mode_flattens_to_500() {
        let config = ErrorConfig {
            classify_status: false,
            log_failures: false,
        };
        let (response, ctx) = run(config, Err(GatewayError::AuthClaimMissing("no sub".into()))).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ctx.error, Some(ErrorKind::AuthClaimMissing));
        let body = envelope(response).await;
        assert_eq!(body.error, "Internal Server Error");
        assert_eq!(body.message, "no sub");
    }

    #[tokio::test]
    async fn successful_responses_pass_through() {
        let (response, ctx) = run(ErrorConfig::default(), Ok(crate::filter::testing::status(StatusCode::CREATED))).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert!(ctx.error.is_none());
    }
}
