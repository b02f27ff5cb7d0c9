//! Driving transfers: perform, wait for readiness, harvest completions.

use crate::channel::Completion;
use crate::error::SchedulerError;

use super::Scheduler;

impl<H: curl::easy::Handler> Scheduler<H> {
    /// Runs `curl_multi_perform` until it stops asking to be called again.
    /// Returns the number of transfers still running.
    pub fn exec(&self) -> Result<u32, SchedulerError> {
        loop {
            match self.multi.perform() {
                Ok(running) => {
                    tracing::trace!(running, "multi perform");
                    return Ok(running);
                }
                Err(e) if e.is_call_perform() => continue,
                Err(e) => {
                    tracing::error!(code = e.code() as i32, "multi perform failed: {}", e);
                    return Err(e.into());
                }
            }
        }
    }

    /// Blocks until some transfer needs attention. Returns 0 at once when every
    /// channel is finished, and 0 when no transfer is active anymore. Transfers
    /// that finished during `exec` and have not been harvested count as ready.
    pub fn wait_for_result(&mut self) -> Result<u32, SchedulerError> {
        if self.all_finished() {
            return Ok(0);
        }
        loop {
            let running = self.exec()?;
            let done = self.resources.len().saturating_sub(running as usize);
            if done > 0 {
                return Ok(u32::try_from(done).unwrap_or(u32::MAX));
            }
            if running == 0 {
                return Ok(0);
            }
            let ready = self.multi.wait(&mut [], self.wait_timeout)?;
            if ready > 0 {
                return Ok(ready);
            }
        }
    }

    /// Hands every completed transfer back to its channel, then refills freed
    /// slots. Returns the number of jobs harvested.
    pub fn read_results(&mut self) -> Result<usize, SchedulerError> {
        let mut done: Vec<(usize, Result<(), curl::Error>)> = Vec::new();
        let mut token_error: Option<curl::Error> = None;
        self.multi.messages(|msg| {
            let Some(result) = msg.result() else {
                return;
            };
            match msg.token() {
                Ok(token) => done.push((token, result)),
                Err(e) => {
                    token_error.get_or_insert(e);
                }
            }
        });

        // A failed detach is terminal for the scheduler, but the rest of the
        // batch is still handed to its channels before the error is returned.
        let mut detach_error: Option<SchedulerError> = None;
        let mut harvested = 0usize;
        for (token, result) in done {
            let Some(handle) = self.resources.take_handle(token) else {
                tracing::warn!(token, "completion for unknown request token");
                continue;
            };
            let mut easy = match self.multi.remove2(handle) {
                Ok(easy) => easy,
                Err(e) => {
                    if let Some(entry) = self.resources.remove(token) {
                        tracing::error!(
                            channel = %entry.channel,
                            job = %entry.job_name,
                            "detaching finished request failed: {}",
                            e
                        );
                    }
                    detach_error.get_or_insert(e.into());
                    continue;
                }
            };
            let completion = Completion::from_transfer(result, &mut easy);
            if let Some(entry) = self.resources.get(token) {
                tracing::debug!(
                    channel = %entry.channel,
                    job = %entry.job_name,
                    code = ?completion.response_code,
                    ok = completion.result.is_ok(),
                    "job finished"
                );
                match self.channels.get_mut(entry.channel.0) {
                    Some(channel) => channel.job_finished(&entry.job_name, completion, easy),
                    None => tracing::warn!(channel = %entry.channel, "completion for unknown channel"),
                }
            }
            self.resources.remove(token);
            harvested += 1;
        }

        if let Some(e) = detach_error {
            return Err(e);
        }
        if let Some(e) = token_error {
            return Err(e.into());
        }
        self.start_jobs()?;
        Ok(harvested)
    }

    /// Waits for activity, then harvests and refills.
    pub fn read(&mut self) -> Result<usize, SchedulerError> {
        self.wait_for_result()?;
        self.read_results()
    }

    /// Calls [`Scheduler::read`] until every channel is finished. Stops early
    /// when nothing is in flight and nothing could be started, e.g. with a
    /// thread limit of 0.
    pub fn run_to_completion(&mut self) -> Result<(), SchedulerError> {
        while !self.all_finished() {
            let harvested = self.read()?;
            if harvested == 0 && self.resources.is_empty() {
                tracing::warn!(
                    thread_limit = self.thread_limit,
                    "no job in flight and none startable, giving up"
                );
                break;
            }
        }
        Ok(())
    }
}
