//! Resolver interface: one short URL in, one outcome out.
//!
//! The dispatcher only depends on this trait, so tests can swap the curl
//! backend for a double.

use crate::outcome::ResolutionOutcome;
use crate::probe::{self, ProbeOptions};
use crate::retry::{self, RetryPolicy};

/// Turns a URL into a [`ResolutionOutcome`].
///
/// Implementations are total: every failure is reported as
/// `ResolutionOutcome::Failed`, never as a panic or error. `resolve` may block
/// (the dispatcher calls it from `spawn_blocking`).
pub trait Resolver: Send + Sync + 'static {
    fn resolve(&self, url: &str) -> ResolutionOutcome;
}

/// Resolver backed by a single libcurl request per URL.
#[derive(Debug, Clone, Default)]
pub struct CurlResolver {
    options: ProbeOptions,
    retry: RetryPolicy,
}

impl CurlResolver {
    pub fn new(options: ProbeOptions, retry: RetryPolicy) -> Self {
        Self { options, retry }
    }

    pub fn options(&self) -> &ProbeOptions {
        &self.options
    }
}

impl Resolver for CurlResolver {
    fn resolve(&self, url: &str) -> ResolutionOutcome {
        if url.trim().is_empty() {
            return ResolutionOutcome::failed("empty URL");
        }
        match retry::run_with_retry(&self.retry, || probe::probe(url, &self.options)) {
            Ok(Some(location)) => ResolutionOutcome::Resolved { location },
            Ok(None) => ResolutionOutcome::NotRedirected,
            Err(e) => ResolutionOutcome::failed(e.to_string()),
        }
    }
}
