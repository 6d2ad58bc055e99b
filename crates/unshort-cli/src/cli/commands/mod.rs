//! CLI command handlers. Each command is in its own file.

mod completions;
mod interrupt;
mod resolve;
mod run;

pub use completions::run_completions;
pub use resolve::run_resolve;
pub use run::run_batch;

#[cfg(test)]
pub(crate) use interrupt::{on_interrupt, Interrupt};
#[cfg(test)]
pub(crate) use run::console_line;
