//! Probe error type, kept typed so the retry layer can classify it.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProbeError {
    /// The input is not an absolute http(s) URL. No request was made.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    /// curl gave up after the configured timeout.
    #[error("timeout")]
    Timeout(#[source] curl::Error),
    /// Any other curl failure (connect, DNS, TLS, protocol).
    #[error("{0}")]
    Curl(#[source] curl::Error),
    /// A `Location` header line could not be decoded.
    #[error("malformed response header")]
    MalformedHeader,
}

impl From<curl::Error> for ProbeError {
    fn from(e: curl::Error) -> Self {
        if e.is_operation_timedout() {
            ProbeError::Timeout(e)
        } else {
            ProbeError::Curl(e)
        }
    }
}
