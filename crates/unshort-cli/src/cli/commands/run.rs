//! `unshort run` – convert every matching link list in a directory.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use unshort_core::batch::{self, BatchError, RunEvent};
use unshort_core::config::UnshortConfig;
use unshort_core::dispatch::DispatchOptions;
use unshort_core::resolver::CurlResolver;

use super::interrupt::abort_on_ctrl_c;

/// Processes input files one after another. A missing or unreadable file is
/// reported and skipped; an interrupt stops the whole run.
pub async fn run_batch(cfg: &UnshortConfig, dir: &Path) -> Result<()> {
    let suffix = cfg.input_suffix.as_str();
    let inputs = batch::discover_inputs(dir, suffix)
        .with_context(|| format!("list {}", dir.display()))?;

    if inputs.is_empty() {
        println!("No files ending with '{}' found.", suffix);
        return Ok(());
    }

    let resolver = Arc::new(CurlResolver::new(cfg.probe_options()?, cfg.retry_policy()));
    let opts = DispatchOptions {
        concurrency: cfg.concurrency,
        abort: Some(abort_on_ctrl_c()),
    };

    let (events_tx, mut events_rx) = tokio::sync::mpsc::channel::<RunEvent>(64);
    let printer = tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            println!("{}", console_line(&event));
        }
    });

    let result = batch::process_inputs(resolver, &inputs, &opts, Some(events_tx)).await;
    let _ = printer.await;
    result.context("run interrupted; the current file was not written")?;
    Ok(())
}

/// Console text for one run event, matching the legacy tool's messages.
pub(crate) fn console_line(event: &RunEvent) -> String {
    match event {
        RunEvent::FileStarted(input) => format!("\nProcessing file: {}", input.display()),
        RunEvent::Progress(progress) => progress.to_string(),
        RunEvent::FileSaved(report) => format!("Results saved to {}", report.output.display()),
        RunEvent::FileSkipped {
            error: e @ BatchError::InputNotFound(_),
            ..
        } => e.to_string(),
        RunEvent::FileSkipped { input, error } => {
            format!("Skipping {}: {}", input.display(), error)
        }
    }
}
