//! FIFO channel of GET jobs with per-job retry.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::mpsc;
use std::time::Duration;

use curl::easy::Easy2;

use crate::error::SchedulerError;
use crate::naming;
use crate::retry::{classify_completion, RetryPolicy};
use crate::scheduler::JobContext;

use super::easy::{build_easy, TransferOptions};
use super::handler::ResponseCollector;
use super::{Channel, Completion};

/// One GET request to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSpec {
    /// Name of the job within its channel.
    pub name: String,
    pub url: String,
    pub headers: HashMap<String, String>,
}

impl JobSpec {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            headers: HashMap::new(),
        }
    }

    /// Job named after the last segment of the URL path.
    pub fn from_url(url: impl Into<String>) -> Self {
        let url = url.into();
        Self::new(naming::job_name_from_url(&url), url)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// Final result of a job, after any retries.
#[derive(Debug, Clone)]
pub struct JobOutcome {
    pub channel: String,
    pub name: String,
    pub url: String,
    /// Attempts made, including the final one.
    pub attempts: u32,
    pub response_code: Option<u32>,
    pub header_lines: Vec<String>,
    pub body: Vec<u8>,
    pub total_time: Option<Duration>,
    /// Why the job failed; `None` on success.
    pub error: Option<String>,
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug)]
struct Pending {
    spec: JobSpec,
    attempt: u32,
}

/// Named queue of GET jobs. Finished jobs are sent to the outcome channel
/// given at construction.
pub struct RequestChannel {
    name: String,
    priority: f64,
    queue: VecDeque<Pending>,
    running: HashMap<String, Pending>,
    names: HashSet<String>,
    options: TransferOptions,
    retry: RetryPolicy,
    outcomes: mpsc::Sender<JobOutcome>,
}

impl RequestChannel {
    /// Negative priorities are clamped to 0.
    pub fn new(
        name: impl Into<String>,
        priority: f64,
        outcomes: mpsc::Sender<JobOutcome>,
    ) -> Self {
        Self {
            name: name.into(),
            priority: priority.max(0.0),
            queue: VecDeque::new(),
            running: HashMap::new(),
            names: HashSet::new(),
            options: TransferOptions::default(),
            retry: RetryPolicy::default(),
            outcomes,
        }
    }

    pub fn with_options(mut self, options: TransferOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Queue a job. A name already used in this channel gets a numeric suffix;
    /// the final name is returned.
    pub fn push(&mut self, mut spec: JobSpec) -> String {
        spec.name = naming::unique_name(&spec.name, &self.names);
        self.names.insert(spec.name.clone());
        let name = spec.name.clone();
        self.queue.push_back(Pending { spec, attempt: 1 });
        name
    }

    pub fn extend<I: IntoIterator<Item = JobSpec>>(&mut self, specs: I) {
        for spec in specs {
            self.push(spec);
        }
    }

    pub fn pending_count(&self) -> usize {
        self.queue.len()
    }

    fn report(&self, pending: Pending, completion: Option<&Completion>, parts: (Vec<String>, Vec<u8>), error: Option<String>) {
        let (header_lines, body) = parts;
        let outcome = JobOutcome {
            channel: self.name.clone(),
            name: pending.spec.name,
            url: pending.spec.url,
            attempts: pending.attempt,
            response_code: completion.and_then(|c| c.response_code),
            header_lines,
            body,
            total_time: completion.and_then(|c| c.total_time),
            error,
        };
        // Receiver gone means nobody cares about results anymore.
        let _ = self.outcomes.send(outcome);
    }
}

impl Channel<ResponseCollector> for RequestChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> f64 {
        self.priority
    }

    fn is_finished(&self) -> bool {
        self.queue.is_empty() && self.running.is_empty()
    }

    fn can_start_job(&self) -> bool {
        !self.queue.is_empty()
    }

    fn running_job_count(&self) -> usize {
        self.running.len()
    }

    fn start_job(&mut self, ctx: &mut JobContext<'_, ResponseCollector>) -> Result<(), SchedulerError> {
        while let Some(pending) = self.queue.pop_front() {
            let handler = ResponseCollector::new(self.options.max_body_bytes);
            match build_easy(handler, &pending.spec.url, &pending.spec.headers, &self.options) {
                Ok(easy) => {
                    let token = ctx.start(pending.spec.name.clone(), easy)?;
                    tracing::debug!(
                        channel = %self.name,
                        job = %pending.spec.name,
                        attempt = pending.attempt,
                        token,
                        "job started"
                    );
                    self.running.insert(pending.spec.name.clone(), pending);
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!(channel = %self.name, job = %pending.spec.name, "invalid request: {}", e);
                    self.report(pending, None, Default::default(), Some(format!("invalid request: {}", e)));
                }
            }
        }
        Ok(())
    }

    fn job_finished(&mut self, job_name: &str, completion: Completion, mut request: Easy2<ResponseCollector>) {
        let Some(mut pending) = self.running.remove(job_name) else {
            tracing::warn!(channel = %self.name, job = job_name, "completion for unknown job");
            return;
        };
        let collector = std::mem::take(request.get_mut());
        let truncated = collector.truncated();

        let Some(kind) = classify_completion(&completion) else {
            tracing::debug!(channel = %self.name, job = job_name, code = ?completion.response_code, "job succeeded");
            self.report(pending, Some(&completion), collector.into_parts(), None);
            return;
        };

        if !truncated && self.retry.should_retry(pending.attempt, kind) {
            tracing::info!(
                channel = %self.name,
                job = job_name,
                attempt = pending.attempt,
                ?kind,
                "job failed, re-queued"
            );
            pending.attempt += 1;
            self.queue.push_back(pending);
            return;
        }

        let error = if truncated {
            format!(
                "response body exceeds {} bytes",
                self.options.max_body_bytes.unwrap_or_default()
            )
        } else {
            match (&completion.result, completion.response_code) {
                (Err(e), _) => e.to_string(),
                (Ok(()), Some(code)) => format!("HTTP {}", code),
                (Ok(()), None) => "no response".to_string(),
            }
        };
        tracing::warn!(channel = %self.name, job = job_name, attempts = pending.attempt, "job failed: {}", error);
        self.report(pending, Some(&completion), collector.into_parts(), Some(error));
    }
}
