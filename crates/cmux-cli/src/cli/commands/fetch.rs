//! Shared driver: build channels, run the scheduler to completion on a
//! blocking thread, collect outcomes.

use anyhow::{bail, Context, Result};
use cmux_core::config::CmuxConfig;
use cmux_core::headers::{HeaderParser, ResponseHead};
use cmux_core::{JobOutcome, JobSpec, RequestChannel, Scheduler};
use std::sync::mpsc;

use crate::cli::manifest::ChannelSpec;

/// One finished job plus its parsed response head.
#[derive(Debug, Clone)]
pub struct FetchedJob {
    pub outcome: JobOutcome,
    pub head: ResponseHead,
}

/// Runs all channels through one scheduler. Blocks; call via `spawn_blocking`.
pub fn fetch_blocking(
    cfg: &CmuxConfig,
    channels: Vec<ChannelSpec>,
    threads: Option<usize>,
) -> Result<Vec<FetchedJob>> {
    let mut options = cfg.scheduler_options();
    if let Some(n) = threads {
        options.thread_limit = n;
    }
    let transfer = cfg.transfer_options();
    let retry = cfg.retry_policy();

    let (tx, rx) = mpsc::channel();
    let mut scheduler = Scheduler::new(options).context("create scheduler")?;
    let total_jobs: usize = channels.iter().map(|c| c.urls.len()).sum();
    tracing::info!(
        channels = channels.len(),
        jobs = total_jobs,
        thread_limit = scheduler.thread_limit(),
        "starting fetch"
    );

    for spec in channels {
        let mut channel = RequestChannel::new(spec.name.clone(), spec.priority, tx.clone())
            .with_options(transfer.clone())
            .with_retry(retry);
        for url in &spec.urls {
            let mut job = JobSpec::from_url(url.clone());
            for (k, v) in &spec.headers {
                job = job.with_header(k.clone(), v.clone());
            }
            channel.push(job);
        }
        scheduler
            .add_channel(channel)
            .with_context(|| format!("register channel {}", spec.name))?;
    }
    drop(tx);

    scheduler.run_to_completion().context("scheduler aborted")?;
    if !scheduler.all_finished() {
        bail!(
            "{} of {} jobs never ran (thread limit {})",
            total_jobs - rx.try_iter().count().min(total_jobs),
            total_jobs,
            scheduler.thread_limit()
        );
    }

    let parser = scheduler.header_parser();
    let fetched: Vec<FetchedJob> = rx
        .try_iter()
        .map(|outcome| {
            let head = parser.parse(&outcome.header_lines);
            FetchedJob { outcome, head }
        })
        .collect();
    tracing::info!(finished = fetched.len(), "fetch complete");
    Ok(fetched)
}

/// Async wrapper around [`fetch_blocking`].
pub async fn fetch(
    cfg: &CmuxConfig,
    channels: Vec<ChannelSpec>,
    threads: Option<usize>,
) -> Result<Vec<FetchedJob>> {
    let cfg = cfg.clone();
    tokio::task::spawn_blocking(move || fetch_blocking(&cfg, channels, threads)).await?
}
