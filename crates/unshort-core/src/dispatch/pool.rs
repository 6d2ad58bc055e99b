//! Refill-style task pool: keep up to `concurrency` jobs running; when one
//! finishes, record it and start the next queued URL until the queue is empty.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::{Id, JoinSet};

use crate::outcome::{Job, JobProgress, ResolutionOutcome};
use crate::resolver::Resolver;

use super::{DispatchError, DispatchOptions};

/// Resolves every URL in `urls` and returns one [`Job`] per URL, in completion order.
///
/// A failing (or panicking) resolution only affects its own job: a task that
/// cannot be joined is matched back to its URL by task id and recorded as
/// `Failed`, while the remaining tasks keep running.
///
/// If `progress_tx` is `Some`, a [`JobProgress`] is sent as each job
/// completes; a dropped receiver is ignored.
pub async fn dispatch<R>(
    resolver: Arc<R>,
    urls: Vec<String>,
    opts: &DispatchOptions,
    progress_tx: Option<mpsc::Sender<JobProgress>>,
) -> Result<Vec<Job>, DispatchError>
where
    R: Resolver + ?Sized,
{
    let total = urls.len();
    let concurrency = opts.concurrency.max(1);
    let mut pending = urls.into_iter();
    let mut results: Vec<Job> = Vec::with_capacity(total);
    let mut join_set = JoinSet::new();
    let mut in_flight: HashMap<Id, String> = HashMap::with_capacity(concurrency);
    let mut cancelled = false;

    tracing::debug!(total, concurrency, "dispatching urls");

    loop {
        while !cancelled && join_set.len() < concurrency && !pending.as_slice().is_empty() {
            if opts.aborted() {
                tracing::info!(
                    started = total - pending.len(),
                    total,
                    "abort requested; waiting for in-flight requests"
                );
                cancelled = true;
                break;
            }
            let Some(url) = pending.next() else {
                break;
            };
            let resolver = Arc::clone(&resolver);
            let task_url = url.clone();
            let handle = join_set.spawn_blocking(move || resolver.resolve(&task_url));
            in_flight.insert(handle.id(), url);
        }

        let Some(res) = join_set.join_next_with_id().await else {
            break;
        };
        let job = match res {
            Ok((id, outcome)) => Job::new(in_flight.remove(&id).unwrap_or_default(), outcome),
            Err(e) => Job::new(
                in_flight.remove(&e.id()).unwrap_or_default(),
                ResolutionOutcome::failed(format!("resolver task failed: {}", e)),
            ),
        };
        record(&job);

        if let Some(tx) = progress_tx.as_ref() {
            let progress = JobProgress {
                done: results.len() + 1,
                total,
                job: job.clone(),
            };
            let _ = tx.send(progress).await;
        }
        results.push(job);
    }

    if cancelled {
        return Err(DispatchError::Cancelled {
            completed: results.len(),
            total,
        });
    }

    Ok(results)
}

fn record(job: &Job) {
    match &job.outcome {
        ResolutionOutcome::Failed { reason } => {
            tracing::warn!(url = %job.url, %reason, "url failed");
        }
        ResolutionOutcome::NotRedirected => {
            tracing::debug!(url = %job.url, "no location header");
        }
        ResolutionOutcome::Resolved { location } => {
            tracing::debug!(url = %job.url, %location, "resolved");
        }
    }
}
