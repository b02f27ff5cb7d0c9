//! Priority-weighted admission scheduler over one curl multi handle.
//!
//! Channels register with the scheduler; each admission pass hands free
//! in-flight slots to the channel whose priority share most exceeds its current
//! share of running jobs. `read` drives transfers, routes completions back to
//! their channels and refills freed slots.

mod admit;
mod choose;
mod context;
mod reactor;
mod resources;

use std::cell::OnceCell;
use std::time::Duration;

use curl::multi::Multi;

use crate::channel::{Channel, ChannelId, ResponseCollector};
use crate::error::SchedulerError;
use crate::headers::{HeaderParser, StandardHeaderParser};

pub use context::JobContext;

use resources::ResourceTable;

/// Construction-time settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerOptions {
    /// Maximum jobs in flight across all channels.
    pub thread_limit: usize,
    /// Upper bound on a single readiness wait; libcurl usually wakes earlier.
    pub wait_timeout: Duration,
    /// `CURLMOPT_MAX_HOST_CONNECTIONS`; `None` leaves libcurl's default.
    pub max_host_connections: Option<usize>,
    /// `CURLMOPT_MAX_TOTAL_CONNECTIONS`; `None` leaves libcurl's default.
    pub max_total_connections: Option<usize>,
    /// Allow HTTP/2 multiplexing of transfers over shared connections.
    pub multiplex: bool,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            thread_limit: 8,
            wait_timeout: Duration::from_secs(1),
            max_host_connections: None,
            max_total_connections: None,
            multiplex: true,
        }
    }
}

/// Owns the multi handle, the registered channels and the table of in-flight
/// requests. Single-threaded: every method runs on the caller's thread.
pub struct Scheduler<H = ResponseCollector> {
    // Declared before `multi` so request handles detach before the multi
    // handle is cleaned up.
    resources: ResourceTable<H>,
    channels: Vec<Box<dyn Channel<H>>>,
    multi: Multi,
    thread_limit: usize,
    sum_priorities: f64,
    wait_timeout: Duration,
    header_parser: OnceCell<Box<dyn HeaderParser>>,
}

/// Creates the multi handle and applies connection options.
fn open_transport(options: &SchedulerOptions) -> Result<Multi, curl::MultiError> {
    let mut multi = Multi::new();
    if let Some(n) = options.max_host_connections {
        multi.set_max_host_connections(n)?;
    }
    if let Some(n) = options.max_total_connections {
        multi.set_max_total_connections(n)?;
    }
    multi.pipelining(false, options.multiplex)?;
    Ok(multi)
}

impl<H: curl::easy::Handler> Scheduler<H> {
    /// Creates the transport handle. Fails with
    /// [`SchedulerError::Initialization`] if libcurl refuses it.
    pub fn new(options: SchedulerOptions) -> Result<Self, SchedulerError> {
        Self::build(options, None, open_transport)
    }

    /// Like [`Scheduler::new`] but with a caller-supplied header parser.
    pub fn with_header_parser<P>(options: SchedulerOptions, parser: P) -> Result<Self, SchedulerError>
    where
        P: HeaderParser + 'static,
    {
        Self::build(options, Some(Box::new(parser)), open_transport)
    }

    fn build<F>(
        options: SchedulerOptions,
        parser: Option<Box<dyn HeaderParser>>,
        open: F,
    ) -> Result<Self, SchedulerError>
    where
        F: FnOnce(&SchedulerOptions) -> Result<Multi, curl::MultiError>,
    {
        curl::init();
        let multi = open(&options).map_err(SchedulerError::initialization)?;
        let header_parser = OnceCell::new();
        if let Some(p) = parser {
            let _ = header_parser.set(p);
        }
        tracing::debug!(
            thread_limit = options.thread_limit,
            multiplex = options.multiplex,
            "scheduler transport created"
        );
        Ok(Self {
            resources: ResourceTable::new(),
            channels: Vec::new(),
            multi,
            thread_limit: options.thread_limit,
            sum_priorities: 0.0,
            wait_timeout: options.wait_timeout,
            header_parser,
        })
    }

    /// Registers a channel and immediately runs an admission pass.
    pub fn add_channel<C>(&mut self, channel: C) -> Result<ChannelId, SchedulerError>
    where
        C: Channel<H> + 'static,
    {
        let id = ChannelId(self.channels.len());
        tracing::info!(
            channel = channel.name(),
            %id,
            priority = channel.priority(),
            "channel registered"
        );
        self.channels.push(Box::new(channel));
        self.sum_priorities = self.channels.iter().map(|c| c.priority()).sum();
        self.start_jobs()?;
        Ok(id)
    }
}

impl<H> Scheduler<H> {
    /// Sets the in-flight budget to `|n|`. Applies from the next admission
    /// pass; jobs already running are never cancelled.
    pub fn set_thread_limit(&mut self, n: i64) {
        self.thread_limit = usize::try_from(n.unsigned_abs()).unwrap_or(usize::MAX);
        tracing::debug!(thread_limit = self.thread_limit, "thread limit changed");
    }

    pub fn thread_limit(&self) -> usize {
        self.thread_limit
    }

    /// The shared transport handle.
    pub fn handle(&self) -> &Multi {
        &self.multi
    }

    /// Parser supplied at construction, or the standard one created on first use.
    pub fn header_parser(&self) -> &dyn HeaderParser {
        self.header_parser
            .get_or_init(|| Box::new(StandardHeaderParser))
            .as_ref()
    }

    /// Jobs currently in flight (size of the resource table).
    pub fn in_flight(&self) -> usize {
        self.resources.len()
    }

    /// In-flight jobs owned by one channel, as seen by the resource table.
    pub fn in_flight_for(&self, id: ChannelId) -> usize {
        self.resources.count_for(id)
    }

    /// Cached sum of channel priorities.
    pub fn sum_priorities(&self) -> f64 {
        self.sum_priorities
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn channel(&self, id: ChannelId) -> Option<&dyn Channel<H>> {
        self.channels.get(id.0).map(|c| c.as_ref())
    }

    pub fn channel_mut(&mut self, id: ChannelId) -> Option<&mut (dyn Channel<H> + 'static)> {
        self.channels.get_mut(id.0).map(|c| c.as_mut())
    }

    /// True when no channel has pending or in-flight work.
    pub fn all_finished(&self) -> bool {
        self.channels.iter().all(|c| c.is_finished())
    }
}

impl<H> Drop for Scheduler<H> {
    fn drop(&mut self) {
        if !self.resources.is_empty() {
            tracing::debug!(
                in_flight = self.resources.len(),
                "detaching in-flight requests"
            );
        }
    }
}
