/// High-level classification of a job failure for retry purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Operation timed out (connect, low-speed abort or overall timeout).
    Timeout,
    /// Server asked us to slow down (429, 503).
    Throttled,
    /// Network-level failure (refused, reset, DNS, empty reply).
    Connection,
    /// Retryable server error that is not throttling.
    Http5xx(u16),
    /// Anything else; never retried.
    Other,
}

/// Attempt budget for one job. Retried jobs are re-queued immediately; there is
/// no backoff at this layer because the scheduler loop never sleeps on behalf
/// of a single channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first). 1 disables retries.
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

impl RetryPolicy {
    /// Policy that never retries.
    pub fn none() -> Self {
        Self { max_attempts: 1 }
    }

    /// Whether a job that failed on `attempt` (1-based) with `kind` gets another try.
    pub fn should_retry(&self, attempt: u32, kind: ErrorKind) -> bool {
        if attempt >= self.max_attempts {
            return false;
        }
        !matches!(kind, ErrorKind::Other)
    }
}
