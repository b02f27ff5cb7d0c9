//! Channels: named, prioritized job queues sharing the scheduler's multi handle.
//!
//! The scheduler only talks to channels through [`Channel`]. [`RequestChannel`]
//! is the bundled implementation that runs plain GET jobs.

mod easy;
mod handler;
mod request;

use std::fmt;
use std::time::Duration;

use curl::easy::Easy2;

use crate::error::SchedulerError;
use crate::scheduler::JobContext;

pub use easy::{build_easy, TransferOptions};
pub use handler::ResponseCollector;
pub use request::{JobOutcome, JobSpec, RequestChannel};

/// Per-scheduler identity of a registered channel. Two channels with the same
/// name still get distinct ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(pub(crate) usize);

impl ChannelId {
    /// Registration index (0 for the first channel added).
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What the transport knows about a finished transfer. Success or failure of
/// the job is for the channel to decide.
#[derive(Debug)]
pub struct Completion {
    /// libcurl's verdict on the transfer itself (connect, timeouts, aborts).
    pub result: Result<(), curl::Error>,
    /// Last HTTP status received, if any.
    pub response_code: Option<u32>,
    pub total_time: Option<Duration>,
    pub downloaded_bytes: Option<u64>,
}

impl Completion {
    /// Collects transfer info from a handle that was just detached from the multi handle.
    pub(crate) fn from_transfer<H>(result: Result<(), curl::Error>, easy: &mut Easy2<H>) -> Self {
        let response_code = easy.response_code().ok().filter(|c| *c != 0);
        let total_time = easy.total_time().ok();
        let downloaded_bytes = easy.download_size().ok().map(|n| n as u64);
        Self {
            result,
            response_code,
            total_time,
            downloaded_bytes,
        }
    }

    /// Transfer completed and the server answered with a 2xx status.
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
            && self
                .response_code
                .map(|c| (200..300).contains(&c))
                .unwrap_or(false)
    }
}

/// Contract a job queue must satisfy to be driven by the scheduler.
///
/// All calls happen on the scheduler's thread, from `add_channel`, `start_jobs`
/// and `read_results`.
pub trait Channel<H> {
    /// Label used in logs.
    fn name(&self) -> &str;

    /// Non-negative weight; a channel's target share of in-flight jobs is its
    /// priority divided by the sum over all channels.
    fn priority(&self) -> f64;

    /// No pending and no in-flight work left.
    fn is_finished(&self) -> bool;

    /// A pending job can be started right now.
    fn can_start_job(&self) -> bool;

    /// Jobs of this channel currently in flight.
    fn running_job_count(&self) -> usize;

    /// Start exactly one job: attach a request to `ctx.handle()` and register
    /// it with [`JobContext::job_started`] (or do both with [`JobContext::start`]).
    fn start_job(&mut self, ctx: &mut JobContext<'_, H>) -> Result<(), SchedulerError>;

    /// A job started by this channel finished. `request` is the detached handle,
    /// handler state included.
    fn job_finished(&mut self, job_name: &str, completion: Completion, request: Easy2<H>);
}
