//! Raw response-head read for replies libcurl refuses to parse.
//!
//! libcurl aborts a transfer whose response carries differing `Location`
//! headers. In that case the request is written by hand on a connect-only
//! handle (curl still does DNS, proxy tunnelling and TLS) and the header block
//! is read as bytes, so every `Location` line reaches the parser.

use std::thread;
use std::time::{Duration, Instant};

use curl::easy::{Easy, HttpVersion};
use url::{Position, Url};

use super::{parse, ProbeError, ProbeMethod, ProbeOptions, MIN_TIMEOUT};

const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// A head larger than this is treated as malformed.
const MAX_HEAD_BYTES: usize = 64 * 1024;

/// CURLE_OPERATION_TIMEDOUT
const OPERATION_TIMEDOUT: u32 = 28;

/// Sends one request for `url` and returns the raw header lines of the final response.
pub(crate) fn fetch_head(url: &Url, opts: &ProbeOptions) -> Result<Vec<Vec<u8>>, ProbeError> {
    let timeout = opts.timeout.max(MIN_TIMEOUT);
    let deadline = Instant::now() + timeout;

    let mut easy = Easy::new();
    easy.url(url.as_str())?;
    easy.connect_only(true)?;
    easy.http_proxy_tunnel(true)?;
    easy.http_version(HttpVersion::V11)?;
    easy.timeout(timeout)?;
    easy.connect_timeout(opts.effective_connect_timeout())?;
    easy.perform()?;

    let request = request_head(url, opts);
    let mut sent = 0;
    while sent < request.len() {
        match easy.send(&request.as_bytes()[sent..]) {
            Ok(n) => sent += n,
            Err(e) if e.is_again() => wait_until(deadline)?,
            Err(e) => return Err(e.into()),
        }
    }

    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        if let Some(end) = parse::final_head_len(&buf) {
            buf.truncate(end);
            break;
        }
        if buf.len() > MAX_HEAD_BYTES {
            return Err(ProbeError::MalformedHeader);
        }
        match easy.recv(&mut chunk) {
            Ok(0) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
            Err(e) if e.is_again() => wait_until(deadline)?,
            Err(e) => return Err(e.into()),
        }
    }

    if !buf.starts_with(b"HTTP/") {
        return Err(ProbeError::MalformedHeader);
    }
    Ok(parse::split_lines(&buf))
}

/// HTTP/1.1 request head matching what curl sends for the same options.
fn request_head(url: &Url, opts: &ProbeOptions) -> String {
    let method = match opts.method {
        ProbeMethod::Get => "GET",
        ProbeMethod::Head => "HEAD",
    };
    let target = &url[Position::BeforePath..Position::AfterQuery];
    let host = &url[Position::BeforeHost..Position::AfterPort];

    let mut head = format!(
        "{} {} HTTP/1.1\r\nHost: {}\r\nAccept: */*\r\n",
        method, target, host
    );
    if let Some(ua) = opts.user_agent.as_deref() {
        head.push_str(&format!("User-Agent: {}\r\n", ua));
    }
    head.push_str("Connection: close\r\n\r\n");
    head
}

fn wait_until(deadline: Instant) -> Result<(), ProbeError> {
    if Instant::now() >= deadline {
        return Err(curl::Error::new(OPERATION_TIMEDOUT).into());
    }
    thread::sleep(POLL_INTERVAL);
    Ok(())
}
