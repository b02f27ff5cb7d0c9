//! Handle a channel gets while starting a job.

use curl::easy::Easy2;
use curl::multi::{Easy2Handle, Multi};

use crate::channel::ChannelId;
use crate::error::SchedulerError;

use super::resources::ResourceTable;

/// Lends a channel the shared multi handle and records the jobs it starts.
pub struct JobContext<'a, H> {
    multi: &'a Multi,
    resources: &'a mut ResourceTable<H>,
    channel: ChannelId,
    started: usize,
}

impl<'a, H> JobContext<'a, H> {
    pub(crate) fn new(
        multi: &'a Multi,
        resources: &'a mut ResourceTable<H>,
        channel: ChannelId,
    ) -> Self {
        Self {
            multi,
            resources,
            channel,
            started: 0,
        }
    }

    /// The channel being asked to start a job.
    pub fn channel_id(&self) -> ChannelId {
        self.channel
    }

    /// Shared transport handle to attach new requests to.
    pub fn handle(&self) -> &Multi {
        self.multi
    }

    /// Registers a request the channel already attached to [`Self::handle`].
    /// Returns the token that identifies it in completion messages.
    pub fn job_started(
        &mut self,
        handle: Easy2Handle<H>,
        job_name: impl Into<String>,
    ) -> Result<usize, SchedulerError> {
        let job_name = job_name.into();
        let token = self.resources.insert(self.channel, job_name, handle)?;
        self.started += 1;
        Ok(token)
    }

    /// Jobs registered through this context so far.
    pub(crate) fn started(&self) -> usize {
        self.started
    }
}

impl<'a, H: curl::easy::Handler> JobContext<'a, H> {
    /// Attaches `easy` to the multi handle and registers it.
    pub fn start(
        &mut self,
        job_name: impl Into<String>,
        easy: Easy2<H>,
    ) -> Result<usize, SchedulerError> {
        let handle = self.multi.add2(easy)?;
        self.job_started(handle, job_name)
    }
}
