//! Classify probe and curl errors into retry policy error kinds.

use crate::probe::ProbeError;
use crate::retry::policy::ErrorKind;

/// Classify a curl error for retry decisions.
pub fn classify_curl_error(e: &curl::Error) -> ErrorKind {
    if e.is_operation_timedout() {
        return ErrorKind::Timeout;
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
    {
        return ErrorKind::Connection;
    }
    ErrorKind::Other
}

/// Classify a probe error into an ErrorKind.
pub fn classify(e: &ProbeError) -> ErrorKind {
    match e {
        ProbeError::Timeout(_) => ErrorKind::Timeout,
        ProbeError::Curl(ce) => classify_curl_error(ce),
        ProbeError::InvalidUrl(_) | ProbeError::MalformedHeader => ErrorKind::Other,
    }
}
