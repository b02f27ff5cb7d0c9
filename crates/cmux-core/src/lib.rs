//! Priority-weighted scheduling of concurrent HTTP requests over one curl
//! multi handle.

pub mod channel;
pub mod checksum;
pub mod config;
pub mod error;
pub mod headers;
pub mod logging;
pub mod naming;
pub mod retry;
pub mod scheduler;

pub use channel::{Channel, ChannelId, Completion, JobOutcome, JobSpec, RequestChannel};
pub use error::SchedulerError;
pub use scheduler::{JobContext, Scheduler, SchedulerOptions};
