//! Ctrl-C handling: raise the dispatcher abort flag instead of killing the process.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Exit status for a forced quit (128 + SIGINT).
const FORCED_EXIT_CODE: i32 = 130;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Interrupt {
    /// Stop starting new requests and let in-flight ones finish.
    Abort,
    /// An abort was already requested; quit now.
    Exit,
}

/// Raises `flag` and reports whether it was already raised.
pub(crate) fn on_interrupt(flag: &AtomicBool) -> Interrupt {
    if flag.swap(true, Ordering::Relaxed) {
        Interrupt::Exit
    } else {
        Interrupt::Abort
    }
}

/// Returns an abort flag that is set on the first Ctrl-C. In-flight requests
/// then finish (or time out) and nothing is written for the current file.
/// A second Ctrl-C exits the process immediately with status 130.
pub fn abort_on_ctrl_c() -> Arc<AtomicBool> {
    let flag = Arc::new(AtomicBool::new(false));
    let task_flag = Arc::clone(&flag);
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            match on_interrupt(&task_flag) {
                Interrupt::Abort => {
                    eprintln!(
                        "interrupt received; waiting for in-flight requests to finish (Ctrl-C again to quit now)"
                    );
                    tracing::info!("interrupt received, aborting dispatch");
                }
                Interrupt::Exit => {
                    eprintln!("second interrupt received; exiting");
                    tracing::warn!("second interrupt received, exiting without waiting");
                    std::process::exit(FORCED_EXIT_CODE);
                }
            }
        }
    });
    flag
}
