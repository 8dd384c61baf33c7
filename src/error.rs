//! Request-path error taxonomy.
//!
//! Every filter and endpoint returns `Result<Response, GatewayError>`. Errors
//! are plain values tagged with an [`ErrorKind`]; they are turned into HTTP
//! responses in exactly one place, the error-translation filter
//! (`http::response`).

use axum::http::StatusCode;
use thiserror::Error;

/// Failure raised while handling a single request.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("No route matches path {path}")]
    RouteNotFound { path: String },

    #[error("{0}")]
    AuthClaimMissing(String),

    #[error("Invalid bearer token: {0}")]
    InvalidToken(String),

    #[error("Request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("{service} unavailable after {attempts} attempt(s): {reason}")]
    BackendUnavailable {
        service: String,
        attempts: u32,
        reason: String,
    },

    #[error("{0}")]
    Unexpected(String),
}

/// Coarse classification of a [`GatewayError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    RouteNotFound,
    AuthClaimMissing,
    InvalidToken,
    PayloadTooLarge,
    BackendUnavailable,
    UnexpectedFailure,
}

impl ErrorKind {
    /// Status code used when errors are classified by kind.
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::RouteNotFound => StatusCode::NOT_FOUND,
            ErrorKind::AuthClaimMissing | ErrorKind::InvalidToken => StatusCode::UNAUTHORIZED,
            ErrorKind::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ErrorKind::BackendUnavailable => StatusCode::BAD_GATEWAY,
            ErrorKind::UnexpectedFailure => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable snake_case label for logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::RouteNotFound => "route_not_found",
            ErrorKind::AuthClaimMissing => "auth_claim_missing",
            ErrorKind::InvalidToken => "invalid_token",
            ErrorKind::PayloadTooLarge => "payload_too_large",
            ErrorKind::BackendUnavailable => "backend_unavailable",
            ErrorKind::UnexpectedFailure => "unexpected_failure",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl GatewayError {
    /// Build a single-attempt backend failure.
    pub fn backend_unavailable(service: impl Into<String>, reason: impl Into<String>) -> Self {
        GatewayError::BackendUnavailable {
            service: service.into(),
            attempts: 1,
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::RouteNotFound { .. } => ErrorKind::RouteNotFound,
            GatewayError::AuthClaimMissing(_) => ErrorKind::AuthClaimMissing,
            GatewayError::InvalidToken(_) => ErrorKind::InvalidToken,
            GatewayError::PayloadTooLarge { .. } => ErrorKind::PayloadTooLarge,
            GatewayError::BackendUnavailable { .. } => ErrorKind::BackendUnavailable,
            GatewayError::Unexpected(_) => ErrorKind::UnexpectedFailure,
        }
    }

    /// Whether the retry filter may attempt the call again.
    ///
    /// Only failures of the upstream call itself qualify; client-side
    /// failures (auth, body limits) would fail identically on every attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GatewayError::BackendUnavailable { .. })
    }

    /// Record the total number of attempts made before giving up.
    pub fn with_attempts(self, total: u32) -> Self {
        match self {
            GatewayError::BackendUnavailable { service, reason, .. } => {
                GatewayError::BackendUnavailable {
                    service,
                    attempts: total,
                    reason,
                }
            }
            other => other,
        }
    }
}

impl From<axum::http::Error> for GatewayError {
    fn from(err: axum::http::Error) -> Self {
        GatewayError::Unexpected(format!("Failed to build HTTP message: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_statuses() {
        let err = GatewayError::RouteNotFound { path: "/nope".into() };
        assert_eq!(err.kind().status(), StatusCode::NOT_FOUND);
        assert_eq!(
            GatewayError::AuthClaimMissing("missing".into()).kind().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            GatewayError::backend_unavailable("USER-SERVICE", "refused").kind().status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn attempts_are_recorded_on_backend_failures_only() {
        let err = GatewayError::backend_unavailable("VIDEO-SERVICE", "timed out").with_attempts(4);
        assert_eq!(
            err.to_string(),
            "VIDEO-SERVICE unavailable after 4 attempt(s): timed out"
        );

        let auth = GatewayError::AuthClaimMissing("no sub".into()).with_attempts(4);
        assert_eq!(auth.to_string(), "no sub");
        assert!(!auth.is_retryable());
    }
}
