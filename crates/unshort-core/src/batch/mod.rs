//! Batch processing of link list files.
//!
//! One input file is read, dispatched and written before the next one starts
//! ([`process_inputs`] runs a whole list that way).
//! Per-URL failures end up in the output; only source-level problems (missing
//! or unreadable input, unwritable output) are returned as [`BatchError`].

mod io;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::dispatch::{self, DispatchError, DispatchOptions};
use crate::outcome::{Job, JobProgress, ResolutionOutcome};
use crate::resolver::Resolver;

pub use io::{
    discover_inputs, output_path_for, read_urls, write_results, INPUT_MARKER, OUTPUT_MARKER,
};

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Input file '{}' not found.", .0.display())]
    InputNotFound(PathBuf),
    #[error("read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

impl BatchError {
    /// True when the whole run should stop rather than skip to the next file.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, BatchError::Dispatch(DispatchError::Cancelled { .. }))
    }
}

/// Summary of one processed input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub total: usize,
    pub resolved: usize,
    pub not_redirected: usize,
    pub failed: usize,
}

impl FileReport {
    fn from_jobs(input: &Path, output: PathBuf, jobs: &[Job]) -> Self {
        let mut report = FileReport {
            input: input.to_path_buf(),
            output,
            total: jobs.len(),
            resolved: 0,
            not_redirected: 0,
            failed: 0,
        };
        for job in jobs {
            match job.outcome {
                ResolutionOutcome::Resolved { .. } => report.resolved += 1,
                ResolutionOutcome::NotRedirected => report.not_redirected += 1,
                ResolutionOutcome::Failed { .. } => report.failed += 1,
            }
        }
        report
    }
}

/// Reads `input`, resolves every URL in it and writes the converted file next to it.
///
/// Nothing is written if dispatch is cancelled.
pub async fn process_file<R>(
    resolver: Arc<R>,
    input: &Path,
    opts: &DispatchOptions,
    progress_tx: Option<mpsc::Sender<JobProgress>>,
) -> Result<FileReport, BatchError>
where
    R: Resolver + ?Sized,
{
    let urls = read_urls(input)?;
    tracing::info!(input = %input.display(), urls = urls.len(), "processing file");

    let jobs = dispatch::dispatch(resolver, urls, opts, progress_tx).await?;

    let output = output_path_for(input);
    write_results(&output, &jobs)?;

    let report = FileReport::from_jobs(input, output, &jobs);
    tracing::info!(
        input = %report.input.display(),
        output = %report.output.display(),
        resolved = report.resolved,
        not_redirected = report.not_redirected,
        failed = report.failed,
        "results saved"
    );
    Ok(report)
}

/// What a multi-file run reports while it goes, in the order it happens.
#[derive(Debug)]
pub enum RunEvent {
    FileStarted(PathBuf),
    Progress(JobProgress),
    FileSaved(FileReport),
    /// The input could not be used; the run moves on to the next file.
    FileSkipped { input: PathBuf, error: BatchError },
}

/// Result of [`process_inputs`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub saved: Vec<FileReport>,
    pub skipped: Vec<PathBuf>,
}

/// Runs [`process_file`] over `inputs`, one file at a time.
///
/// A missing or unreadable input, or an output that cannot be written, is
/// reported as [`RunEvent::FileSkipped`] and the remaining files still run.
/// Cancellation stops the run and is returned as the error.
pub async fn process_inputs<R>(
    resolver: Arc<R>,
    inputs: &[PathBuf],
    opts: &DispatchOptions,
    events: Option<mpsc::Sender<RunEvent>>,
) -> Result<RunSummary, BatchError>
where
    R: Resolver + ?Sized,
{
    let mut summary = RunSummary::default();

    for input in inputs {
        emit(&events, RunEvent::FileStarted(input.clone())).await;

        let (progress_tx, mut progress_rx) = mpsc::channel::<JobProgress>(64);
        let forward = async {
            while let Some(progress) = progress_rx.recv().await {
                emit(&events, RunEvent::Progress(progress)).await;
            }
        };
        let (result, ()) = tokio::join!(
            process_file(Arc::clone(&resolver), input, opts, Some(progress_tx)),
            forward
        );

        match result {
            Ok(report) => {
                summary.saved.push(report.clone());
                emit(&events, RunEvent::FileSaved(report)).await;
            }
            Err(e) if e.is_cancelled() => {
                tracing::info!(input = %input.display(), "run cancelled; file not written");
                return Err(e);
            }
            Err(e) => {
                tracing::warn!(input = %input.display(), "skipping file: {}", e);
                summary.skipped.push(input.clone());
                let event = RunEvent::FileSkipped {
                    input: input.clone(),
                    error: e,
                };
                emit(&events, event).await;
            }
        }
    }

    tracing::info!(
        saved = summary.saved.len(),
        skipped = summary.skipped.len(),
        "run finished"
    );
    Ok(summary)
}

async fn emit(events: &Option<mpsc::Sender<RunEvent>>, event: RunEvent) {
    if let Some(tx) = events {
        let _ = tx.send(event).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::AtomicBool;
    use tempfile::tempdir;

    struct TableResolver;

    impl Resolver for TableResolver {
        fn resolve(&self, url: &str) -> ResolutionOutcome {
            match url.rsplit('/').next() {
                Some("ok") => ResolutionOutcome::Resolved {
                    location: "https://example.com/ok".to_string(),
                },
                Some("plain") => ResolutionOutcome::NotRedirected,
                _ => ResolutionOutcome::failed("timeout"),
            }
        }
    }

    #[tokio::test]
    async fn process_file_writes_converted_output() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("me_tco_links.txt");
        fs::write(
            &input,
            "https://t.co/ok\n\nhttps://t.co/plain\n  https://t.co/slow  \n",
        )
        .unwrap();

        let report = process_file(Arc::new(TableResolver), &input, &DispatchOptions::default(), None)
            .await
            .unwrap();

        assert_eq!(report.output, dir.path().join("me_converted_links.txt"));
        assert_eq!(report.total, 3);
        assert_eq!(report.resolved, 1);
        assert_eq!(report.not_redirected, 1);
        assert_eq!(report.failed, 1);

        let text = fs::read_to_string(&report.output).unwrap();
        let mut lines: Vec<&str> = text.lines().collect();
        lines.sort();
        assert_eq!(
            lines,
            vec![
                "Error processing https://t.co/slow: timeout",
                "No Location header found for https://t.co/plain",
                "https://example.com/ok",
            ]
        );
    }

    #[tokio::test]
    async fn process_file_missing_input_writes_nothing() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("missing_tco_links.txt");
        let err = process_file(Arc::new(TableResolver), &input, &DispatchOptions::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, BatchError::InputNotFound(_)));
        assert!(!err.is_cancelled());
        assert!(!dir.path().join("missing_converted_links.txt").exists());
    }

    #[tokio::test]
    async fn cancelled_dispatch_persists_nothing() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("c_tco_links.txt");
        fs::write(&input, "https://t.co/ok\nhttps://t.co/plain\n").unwrap();
        let opts = DispatchOptions {
            concurrency: 1,
            abort: Some(Arc::new(AtomicBool::new(true))),
        };
        let err = process_file(Arc::new(TableResolver), &input, &opts, None)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
        assert!(!dir.path().join("c_converted_links.txt").exists());
    }

    #[tokio::test]
    async fn empty_input_file_produces_empty_output() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("e_tco_links.txt");
        fs::write(&input, "\n  \n").unwrap();
        let report = process_file(Arc::new(TableResolver), &input, &DispatchOptions::default(), None)
            .await
            .unwrap();
        assert_eq!(report.total, 0);
        assert_eq!(fs::read_to_string(&report.output).unwrap(), "");
    }

    #[tokio::test]
    async fn unusable_inputs_are_skipped_and_the_rest_still_run() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("gone_tco_links.txt");
        let unreadable = dir.path().join("folder_tco_links.txt");
        fs::create_dir(&unreadable).unwrap();
        let good = dir.path().join("good_tco_links.txt");
        fs::write(&good, "https://t.co/ok\nhttps://t.co/plain\n").unwrap();

        let (tx, mut rx) = mpsc::channel::<RunEvent>(64);
        let inputs = vec![missing.clone(), unreadable.clone(), good.clone()];
        let summary = process_inputs(
            Arc::new(TableResolver),
            &inputs,
            &DispatchOptions::default(),
            Some(tx),
        )
        .await
        .unwrap();

        assert_eq!(summary.skipped, vec![missing.clone(), unreadable.clone()]);
        assert_eq!(summary.saved.len(), 1);
        let output = dir.path().join("good_converted_links.txt");
        assert_eq!(summary.saved[0].output, output);
        assert_eq!(fs::read_to_string(&output).unwrap().lines().count(), 2);

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        assert!(matches!(
            &events[1],
            RunEvent::FileSkipped { error: BatchError::InputNotFound(_), .. }
        ));
        assert!(matches!(
            &events[3],
            RunEvent::FileSkipped { error: BatchError::Read { .. }, .. }
        ));
        let progress = events
            .iter()
            .filter(|e| matches!(e, RunEvent::Progress(_)))
            .count();
        assert_eq!(progress, 2);
        assert!(matches!(events.last(), Some(RunEvent::FileSaved(_))));
    }

    #[tokio::test]
    async fn cancelled_run_stops_before_later_files() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("a_tco_links.txt");
        let second = dir.path().join("b_tco_links.txt");
        fs::write(&first, "https://t.co/ok\n").unwrap();
        fs::write(&second, "https://t.co/ok\n").unwrap();
        let opts = DispatchOptions {
            concurrency: 1,
            abort: Some(Arc::new(AtomicBool::new(true))),
        };

        let err = process_inputs(Arc::new(TableResolver), &[first, second], &opts, None)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
        assert!(!dir.path().join("a_converted_links.txt").exists());
        assert!(!dir.path().join("b_converted_links.txt").exists());
    }
}
