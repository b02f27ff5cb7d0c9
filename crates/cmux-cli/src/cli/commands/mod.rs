//! CLI command handlers.

mod checksum;
mod fetch;
mod get;
mod run;

pub use checksum::run_checksum;
pub use get::run_get;
pub use run::run_manifest;
pub use fetch::FetchedJob;
