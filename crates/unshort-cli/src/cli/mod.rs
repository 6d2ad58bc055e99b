//! CLI for the unshort link resolver.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use unshort_core::config::{self, UnshortConfig};
use unshort_core::probe::ProbeMethod;

use commands::{run_batch, run_completions, run_resolve};

/// Top-level CLI for unshort.
#[derive(Debug, Parser)]
#[command(name = "unshort")]
#[command(about = "unshort: resolve t.co-style short links by reading the Location header", long_about = None)]
pub struct Cli {
    /// Defaults to `run` in the current directory.
    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Convert every `*tco_links.txt` file in a directory into `*converted_links.txt`.
    Run(RunArgs),

    /// Resolve the given URLs and print one output line per URL.
    Resolve {
        /// Short URLs to resolve.
        #[arg(required = true, value_name = "URL")]
        urls: Vec<String>,

        #[command(flatten)]
        probe: ProbeArgs,
    },

    /// Print shell completions to stdout.
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct RunArgs {
    /// Directory to search for input files (default: current directory).
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Input filename suffix (default from config: "tco_links.txt").
    #[arg(long, value_name = "SUFFIX")]
    pub suffix: Option<String>,

    #[command(flatten)]
    pub probe: ProbeArgs,
}

/// Overrides for the request settings in config.toml.
#[derive(Debug, Clone, Default, Args)]
pub struct ProbeArgs {
    /// Maximum number of requests in flight at once.
    #[arg(short = 'j', long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Per-request timeout in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<f64>,

    /// Request method.
    #[arg(long, value_enum)]
    pub method: Option<MethodArg>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MethodArg {
    Get,
    Head,
}

impl From<MethodArg> for ProbeMethod {
    fn from(m: MethodArg) -> Self {
        match m {
            MethodArg::Get => ProbeMethod::Get,
            MethodArg::Head => ProbeMethod::Head,
        }
    }
}

impl ProbeArgs {
    /// Applies command-line overrides on top of the loaded config and re-validates it.
    pub fn apply(&self, cfg: &mut UnshortConfig) -> Result<()> {
        if let Some(n) = self.concurrency {
            cfg.concurrency = n;
        }
        if let Some(secs) = self.timeout {
            cfg.timeout_secs = secs;
        }
        if let Some(m) = self.method {
            cfg.method = m.into();
        }
        cfg.validate()
    }
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let command = cli.command.unwrap_or(CliCommand::Run(RunArgs::default()));

        if let CliCommand::Completions { shell } = command {
            return run_completions(shell);
        }

        let mut cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match command {
            CliCommand::Run(args) => {
                args.probe.apply(&mut cfg)?;
                if let Some(suffix) = args.suffix {
                    cfg.input_suffix = suffix;
                    cfg.validate()?;
                }
                let dir = match args.dir {
                    Some(dir) => dir,
                    None => std::env::current_dir()?,
                };
                run_batch(&cfg, &dir).await?;
            }
            CliCommand::Resolve { urls, probe } => {
                probe.apply(&mut cfg)?;
                run_resolve(&cfg, urls).await?;
            }
            CliCommand::Completions { .. } => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
