//! Classify HTTP status and curl errors into retry error kinds.

use crate::channel::Completion;
use crate::retry::policy::ErrorKind;

/// Classify an HTTP status code for retry decisions.
pub fn classify_http_status(code: u32) -> ErrorKind {
    match code {
        429 | 503 => ErrorKind::Throttled,
        500..=599 => ErrorKind::Http5xx(code as u16),
        _ => ErrorKind::Other,
    }
}

/// Classify a curl transfer error for retry decisions.
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
        || e.is_partial_file()
    {
        return ErrorKind::Connection;
    }
    ErrorKind::Other
}

/// Classify a finished job. Returns `None` when the job succeeded
/// (transfer completed with a 2xx or 3xx status).
pub fn classify_completion(completion: &Completion) -> Option<ErrorKind> {
    if let Err(e) = &completion.result {
        return Some(classify_curl_error(e));
    }
    match completion.response_code {
        Some(code) if (200..400).contains(&code) => None,
        Some(code) => Some(classify_http_status(code)),
        None => Some(ErrorKind::Other),
    }
}
