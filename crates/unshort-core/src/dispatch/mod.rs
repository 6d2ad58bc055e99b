//! Bounded-concurrency dispatcher.
//!
//! Runs a [`Resolver`](crate::resolver::Resolver) over a batch of URLs with at
//! most `concurrency` resolutions in flight. Jobs are collected in completion
//! order, which is also the order of the converted output file.

mod pool;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;

pub use pool::dispatch;

/// Default number of simultaneous in-flight requests.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Options for one [`dispatch`] call.
#[derive(Debug, Clone)]
pub struct DispatchOptions {
    /// Maximum resolutions in flight at once (0 is treated as 1).
    pub concurrency: usize,
    /// When set to true, no further jobs are started. In-flight jobs still run
    /// to completion (or their own timeout), then dispatch returns
    /// [`DispatchError::Cancelled`].
    pub abort: Option<Arc<AtomicBool>>,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            abort: None,
        }
    }
}

impl DispatchOptions {
    pub fn with_concurrency(concurrency: usize) -> Self {
        Self {
            concurrency,
            ..Self::default()
        }
    }

    fn aborted(&self) -> bool {
        self.abort
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    /// The abort flag was raised before every job could start.
    #[error("dispatch cancelled after {completed} of {total} job(s)")]
    Cancelled { completed: usize, total: usize },
}
