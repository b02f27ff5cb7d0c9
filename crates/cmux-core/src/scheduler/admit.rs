//! Admission passes: hand free slots to the most under-served channels.

use crate::channel::ChannelId;
use crate::error::SchedulerError;

use super::choose::{choose_channel, Candidate};
use super::context::JobContext;
use super::Scheduler;

impl<H: curl::easy::Handler> Scheduler<H> {
    /// Starts jobs until the thread limit is reached or no channel can start
    /// one, then runs one `exec` step so new transfers get going. Returns the
    /// number of jobs started.
    pub fn start_jobs(&mut self) -> Result<usize, SchedulerError> {
        let mut started = 0usize;
        // Channels that were selected but registered nothing; skipped for the
        // rest of this pass so the loop cannot spin on them.
        let mut stalled: Vec<usize> = Vec::new();

        while let Some(index) = self.select_channel(&stalled) {
            let id = ChannelId(index);
            let channel = &mut self.channels[index];
            let mut ctx = JobContext::new(&self.multi, &mut self.resources, id);
            channel.start_job(&mut ctx)?;
            let n = ctx.started();
            if n == 0 {
                tracing::warn!(
                    channel = channel.name(),
                    %id,
                    "channel reported a startable job but started none"
                );
                stalled.push(index);
                continue;
            }
            started += n;
            tracing::debug!(
                channel = channel.name(),
                %id,
                running = channel.running_job_count(),
                in_flight = self.resources.len(),
                "admitted job"
            );
        }

        if started > 0 {
            tracing::debug!(
                started,
                in_flight = self.resources.len(),
                thread_limit = self.thread_limit,
                "admission pass done"
            );
        }
        self.exec()?;
        Ok(started)
    }

    /// One selection step over channels able to start a job, in registration order.
    fn select_channel(&self, excluded: &[usize]) -> Option<usize> {
        let candidates = self
            .channels
            .iter()
            .enumerate()
            .filter(|(i, c)| !excluded.contains(i) && c.can_start_job())
            .map(|(index, c)| Candidate {
                index,
                priority: c.priority(),
                running: c.running_job_count(),
            });
        choose_channel(
            candidates,
            self.sum_priorities,
            self.resources.len(),
            self.thread_limit,
        )
    }
}
