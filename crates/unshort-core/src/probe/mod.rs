//! Single-request redirect probing.
//!
//! Uses the curl crate (libcurl) to issue exactly one request per URL with
//! redirect following disabled, collects the response header lines and
//! extracts the `Location` target.

mod error;
mod parse;
mod raw;

pub use error::ProbeError;

use std::borrow::Cow;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Lower bound for timeouts handed to curl; a zero timeout means "no timeout" to libcurl.
const MIN_TIMEOUT: Duration = Duration::from_millis(1);

/// CURLE_WEIRD_SERVER_REPLY; libcurl 8 reports differing `Location` headers with it.
const WEIRD_SERVER_REPLY: u32 = 8;

/// HTTP method used for the probe request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeMethod {
    /// GET with the body read and discarded (same request shape as `curl -i`).
    #[default]
    Get,
    /// HEAD; cheaper, but a few shorteners answer HEAD differently.
    Head,
}

/// Per-request settings for [`probe`].
#[derive(Debug, Clone)]
pub struct ProbeOptions {
    /// Whole-request timeout.
    pub timeout: Duration,
    /// Connect-phase timeout; never longer than `timeout`.
    pub connect_timeout: Option<Duration>,
    pub method: ProbeMethod,
    pub user_agent: Option<String>,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

impl ProbeOptions {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout: timeout.max(MIN_TIMEOUT),
            connect_timeout: None,
            method: ProbeMethod::Get,
            user_agent: None,
        }
    }

    fn effective_connect_timeout(&self) -> Duration {
        self.connect_timeout
            .unwrap_or(self.timeout)
            .min(self.timeout)
            .max(MIN_TIMEOUT)
    }
}

/// Performs one request to `url` and returns the `Location` target, if any.
///
/// Redirects are not followed, so only the headers of the response to `url`
/// itself are inspected. Input without a scheme is treated as `http://`, as
/// curl does. Runs in the current thread; call from `spawn_blocking` if used
/// from async code.
pub fn probe(url: &str, opts: &ProbeOptions) -> Result<Option<String>, ProbeError> {
    let url = with_default_scheme(url);
    let parsed = url::Url::parse(&url).map_err(|e| ProbeError::InvalidUrl(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ProbeError::InvalidUrl(format!(
            "unsupported scheme '{}'",
            parsed.scheme()
        )));
    }

    let mut headers: Vec<Vec<u8>> = Vec::new();
    match perform(&url, opts, &mut headers) {
        Ok(()) => parse::location_from_headers(&headers),
        Err(e)
            if e.code() == WEIRD_SERVER_REPLY
                && matches!(parse::location_from_headers(&headers), Ok(Some(_))) =>
        {
            tracing::debug!(url = %parsed, "curl rejected repeated Location headers; reading raw response head");
            let head = raw::fetch_head(&parsed, opts)?;
            parse::location_from_headers(&head)
        }
        Err(e) => Err(e.into()),
    }
}

/// Prefixes `http://` when `url` has no `scheme://` part.
fn with_default_scheme(url: &str) -> Cow<'_, str> {
    if url.contains("://") {
        Cow::Borrowed(url)
    } else {
        Cow::Owned(format!("http://{}", url))
    }
}

fn perform(url: &str, opts: &ProbeOptions, headers: &mut Vec<Vec<u8>>) -> Result<(), curl::Error> {
    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(false)?;
    match opts.method {
        ProbeMethod::Get => easy.get(true)?,
        ProbeMethod::Head => easy.nobody(true)?,
    }
    easy.timeout(opts.timeout.max(MIN_TIMEOUT))?;
    easy.connect_timeout(opts.effective_connect_timeout())?;
    if let Some(ua) = opts.user_agent.as_deref() {
        easy.useragent(ua)?;
    }

    let mut transfer = easy.transfer();
    transfer.header_function(|data| {
        headers.push(data.to_vec());
        true
    })?;
    // Body is only read so the server sees a complete GET; it is not inspected.
    transfer.write_function(|data| Ok(data.len()))?;
    transfer.perform()
}
