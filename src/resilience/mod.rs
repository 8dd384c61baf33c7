//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to backend:
//!     → retries.rs (re-run failed attempts)
//!     → backoff.rs (fixed delay before each retry)
//!     → timeouts.rs (deadline per attempt, enforced by the proxy endpoint)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every upstream attempt has a deadline
//! - Retry is an ordinary filter wrapping the proxy endpoint
//! - Exhausted retries hand the failure to error translation, never retried again

pub mod backoff;
pub mod retries;
pub mod timeouts;

pub use retries::RetryFilter;
