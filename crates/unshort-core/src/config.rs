use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::probe::{ProbeMethod, ProbeOptions};
use crate::retry::RetryPolicy;

/// Suffix of the link lists written by the scraper userscript.
pub const DEFAULT_INPUT_SUFFIX: &str = "tco_links.txt";

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per URL (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.25 = 250ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 0.25,
            max_delay_secs: 30,
        }
    }
}

/// Global configuration loaded from `~/.config/unshort/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UnshortConfig {
    /// Maximum number of requests in flight at once.
    pub concurrency: usize,
    /// Maximum wait per request, in seconds, before it counts as failed.
    pub timeout_secs: f64,
    /// Optional bound on the connect phase, in seconds (capped at `timeout_secs`).
    pub connect_timeout_secs: Option<f64>,
    /// Request method: "get" (default) or "head".
    pub method: ProbeMethod,
    /// Optional User-Agent header.
    pub user_agent: Option<String>,
    /// Input files are discovered by this filename suffix.
    pub input_suffix: String,
    /// Optional retry policy; if missing, each URL gets exactly one attempt.
    pub retry: Option<RetryConfig>,
}

impl Default for UnshortConfig {
    fn default() -> Self {
        Self {
            concurrency: 10,
            timeout_secs: 10.0,
            connect_timeout_secs: None,
            method: ProbeMethod::Get,
            user_agent: None,
            input_suffix: DEFAULT_INPUT_SUFFIX.to_string(),
            retry: None,
        }
    }
}

impl UnshortConfig {
    /// Rejects values the dispatcher or curl cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            anyhow::bail!("concurrency must be at least 1");
        }
        positive_secs("timeout_secs", self.timeout_secs)?;
        if let Some(secs) = self.connect_timeout_secs {
            positive_secs("connect_timeout_secs", secs)?;
        }
        if self.input_suffix.trim().is_empty() {
            anyhow::bail!("input_suffix must not be empty");
        }
        if let Some(retry) = &self.retry {
            if retry.max_attempts == 0 {
                anyhow::bail!("retry.max_attempts must be at least 1");
            }
            if !retry.base_delay_secs.is_finite() || retry.base_delay_secs < 0.0 {
                anyhow::bail!("retry.base_delay_secs must be a non-negative number");
            }
        }
        Ok(())
    }

    pub fn probe_options(&self) -> Result<ProbeOptions> {
        let mut opts = ProbeOptions::new(positive_secs("timeout_secs", self.timeout_secs)?);
        opts.connect_timeout = self
            .connect_timeout_secs
            .map(|s| positive_secs("connect_timeout_secs", s))
            .transpose()?;
        opts.method = self.method;
        opts.user_agent = self.user_agent.clone();
        Ok(opts)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
            .as_ref()
            .map(RetryPolicy::from)
            .unwrap_or_default()
    }
}

fn positive_secs(name: &str, secs: f64) -> Result<Duration> {
    if !secs.is_finite() || secs <= 0.0 {
        anyhow::bail!("{} must be a positive number of seconds (got {})", name, secs);
    }
    Duration::try_from_secs_f64(secs).with_context(|| format!("{} out of range", name))
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("unshort")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from the XDG config dir, creating a default file if none exists.
pub fn load_or_init() -> Result<UnshortConfig> {
    load_or_init_at(&config_path()?)
}

/// Load configuration from `path`, writing defaults there first if it does not exist.
pub fn load_or_init_at(path: &Path) -> Result<UnshortConfig> {
    if !path.exists() {
        let default_cfg = UnshortConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml).with_context(|| format!("write {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: UnshortConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}
