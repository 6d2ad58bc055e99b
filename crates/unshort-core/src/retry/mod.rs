//! Retry and backoff policy.
//!
//! Error classification (timeouts, connection failures) and exponential
//! backoff decisions for the resolver. The default policy makes a single
//! attempt per URL; retries only happen when `[retry]` is configured.

mod classify;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error};
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
