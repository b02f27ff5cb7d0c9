//! Building configured Easy2 handles for GET jobs.

use std::collections::HashMap;
use std::time::Duration;

use curl::easy::{Easy2, Handler, List};

/// Per-transfer curl settings shared by every job of a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOptions {
    pub connect_timeout: Duration,
    /// Abort if throughput stays below `low_speed_limit` bytes/s for `low_speed_time`.
    pub low_speed_limit: u32,
    pub low_speed_time: Duration,
    /// Hard wall-clock limit so a stuck transfer eventually fails.
    pub timeout: Duration,
    pub max_redirections: u32,
    pub max_recv_speed: Option<u64>,
    pub buffer_size: Option<usize>,
    pub user_agent: Option<String>,
    pub max_body_bytes: Option<u64>,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            low_speed_limit: 1024,
            low_speed_time: Duration::from_secs(60),
            timeout: Duration::from_secs(3600),
            max_redirections: 10,
            max_recv_speed: None,
            buffer_size: None,
            user_agent: None,
            max_body_bytes: None,
        }
    }
}

/// Creates an Easy2 GET handle for `url` with `options` and `headers` applied.
/// The handle is not attached to any multi handle yet.
pub fn build_easy<H: Handler>(
    handler: H,
    url: &str,
    headers: &HashMap<String, String>,
    options: &TransferOptions,
) -> Result<Easy2<H>, curl::Error> {
    let mut easy = Easy2::new(handler);
    easy.url(url)?;
    easy.get(true)?;
    easy.follow_location(true)?;
    easy.max_redirections(options.max_redirections)?;
    easy.connect_timeout(options.connect_timeout)?;
    easy.low_speed_limit(options.low_speed_limit)?;
    easy.low_speed_time(options.low_speed_time)?;
    easy.timeout(options.timeout)?;
    if let Some(speed) = options.max_recv_speed {
        easy.max_recv_speed(speed)?;
    }
    if let Some(sz) = options.buffer_size {
        easy.buffer_size(sz)?;
    }
    if let Some(ua) = &options.user_agent {
        easy.useragent(ua)?;
    }
    if !headers.is_empty() {
        let mut list = List::new();
        for (k, v) in headers {
            list.append(&format!("{}: {}", k.trim(), v.trim()))?;
        }
        easy.http_headers(list)?;
    }
    Ok(easy)
}
