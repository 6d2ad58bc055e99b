//! `unshort resolve <url>...` – resolve URLs given on the command line.

use anyhow::Result;
use std::sync::Arc;
use unshort_core::config::UnshortConfig;
use unshort_core::dispatch::{self, DispatchOptions};
use unshort_core::resolver::CurlResolver;

use super::interrupt::abort_on_ctrl_c;

/// Prints one output line per URL, in completion order.
pub async fn run_resolve(cfg: &UnshortConfig, urls: Vec<String>) -> Result<()> {
    let resolver = Arc::new(CurlResolver::new(cfg.probe_options()?, cfg.retry_policy()));
    let opts = DispatchOptions {
        concurrency: cfg.concurrency,
        abort: Some(abort_on_ctrl_c()),
    };

    let jobs = dispatch::dispatch(resolver, urls, &opts, None).await?;
    for job in &jobs {
        println!("{}", job.output_line());
    }
    Ok(())
}
