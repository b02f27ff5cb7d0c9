//! Retry classification for finished jobs.
//!
//! The scheduler never retries anything itself. Channels use this module to
//! decide whether a failed job goes back into their queue as a new job.

mod classify;
mod policy;

pub use classify::{classify_completion, classify_curl_error, classify_http_status};
pub use policy::{ErrorKind, RetryPolicy};
