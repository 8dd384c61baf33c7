//! Timeout enforcement.
//!
//! # Responsibilities
//! - Bound every upstream attempt with a deadline
//! - Cancel the attempt cleanly when the deadline passes
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - A timed-out attempt is a retryable backend failure
//! - The attempt deadline is separate from the retry backoff

use std::future::Future;
use std::time::Duration;

use crate::error::GatewayError;

/// Await `fut` for at most `limit`, mapping expiry to a backend failure.
pub async fn within<F>(limit: Duration, service: &str, fut: F) -> Result<F::Output, GatewayError>
where
    F: Future,
{
    tokio::time::timeout(limit, fut).await.map_err(|_| {
        GatewayError::backend_unavailable(
            service,
            format!("timed out after {}ms", limit.as_millis()),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[tokio::test]
    async fn completes_fast_futures() {
        let value = within(Duration::from_millis(200), "USER-SERVICE", async { 7 })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn slow_futures_become_backend_failures() {
        let err = within(
            Duration::from_millis(10),
            "ANALYTICS-SERVICE",
            tokio::time::sleep(Duration::from_secs(5)),
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::BackendUnavailable);
        assert!(err.is_retryable());
        assert!(err.to_string().contains("timed out after 10ms"));
    }
}
