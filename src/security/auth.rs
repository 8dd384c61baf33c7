//! Authentication filter.
//! Turns a verified bearer token into a forwarded `X-User-Id` header.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{header, HeaderValue};

use crate::config::AuthConfig;
use crate::error::GatewayError;
use crate::filter::context::X_USER_ID;
use crate::filter::{AuthenticatedPrincipal, Filter, FilterResult, Next, RequestContext};
use crate::security::jwt::TokenVerifier;

#[derive(Debug, Clone)]
pub struct AuthenticationFilter {
    verifier: Arc<dyn TokenVerifier>,
    subject_claim: String,
    public_paths: HashSet<String>,
}

impl AuthenticationFilter {
    pub fn new(verifier: Arc<dyn TokenVerifier>, config: &AuthConfig) -> Self {
        Self {
            verifier,
            subject_claim: config.subject_claim.clone(),
            public_paths: config.public_paths.iter().cloned().collect(),
        }
    }

    fn authenticate(&self, ctx: &RequestContext) -> Result<AuthenticatedPrincipal, GatewayError> {
        let token = ctx
            .inbound_header(header::AUTHORIZATION.as_str())
            .and_then(bearer_token)
            .ok_or_else(|| GatewayError::AuthClaimMissing("Missing bearer token".into()))?;

        let claims = self.verifier.verify(token)?;
        AuthenticatedPrincipal::from_claims(claims, &self.subject_claim)
    }
}

/// Extract the credentials of a `Bearer` authorization value.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[async_trait]
impl Filter for AuthenticationFilter {
    fn name(&self) -> &'static str {
        "authentication"
    }

    async fn apply(&self, ctx: &mut RequestContext, next: Next<'_>) -> FilterResult {
        // never trust an identity asserted by the client
        ctx.headers.remove(X_USER_ID);

        if self.public_paths.contains(ctx.path()) {
            return next.run(ctx).await;
        }

        let principal = self.authenticate(ctx)?;
        let value = HeaderValue::from_str(&principal.subject_id).map_err(|_| {
            GatewayError::AuthClaimMissing("Subject claim is not a valid header value".into())
        })?;

        tracing::debug!(
            request_id = ?ctx.request_id,
            subject = %principal.subject_id,
            "Request authenticated"
        );

        ctx.headers.insert(X_USER_ID, value);
        ctx.forwarded_user = Some(principal.subject_id.clone());
        ctx.principal = Some(principal);

        next.run(ctx).await
    }
}
