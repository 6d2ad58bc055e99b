//! Resolution outcomes and the jobs that carry them.
//!
//! The text produced by [`Job::output_line`] is the persisted output format and
//! must stay bit-exact for downstream consumers of the converted files.

use std::fmt;

/// Terminal result of resolving one short URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// The response carried a non-empty `Location` header.
    Resolved { location: String },
    /// The request completed but no `Location` header was present.
    NotRedirected,
    /// The request could not be completed (timeout, transport error, bad response).
    Failed { reason: String },
}

impl ResolutionOutcome {
    pub fn failed(reason: impl Into<String>) -> Self {
        ResolutionOutcome::Failed {
            reason: reason.into(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, ResolutionOutcome::Resolved { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ResolutionOutcome::Failed { .. })
    }

    /// Output line for this outcome as written to the converted file.
    pub fn render(&self, url: &str) -> String {
        match self {
            ResolutionOutcome::Resolved { location } => location.clone(),
            ResolutionOutcome::NotRedirected => format!("No Location header found for {}", url),
            ResolutionOutcome::Failed { reason } => format!("Error processing {}: {}", url, reason),
        }
    }
}

/// One input URL paired with its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub url: String,
    pub outcome: ResolutionOutcome,
}

impl Job {
    pub fn new(url: impl Into<String>, outcome: ResolutionOutcome) -> Self {
        Self {
            url: url.into(),
            outcome,
        }
    }

    pub fn output_line(&self) -> String {
        self.outcome.render(&self.url)
    }
}

/// Progress notification sent once per completed job (console/log only, never persisted).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobProgress {
    /// Number of jobs completed so far, including this one.
    pub done: usize,
    /// Total number of jobs in the batch.
    pub total: usize,
    pub job: Job,
}

impl fmt::Display for JobProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Processed URL: {} -> {}",
            self.job.url,
            self.job.output_line()
        )
    }
}
