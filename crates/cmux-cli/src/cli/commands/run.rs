//! `cmux run` – fetch every channel of a manifest.

use anyhow::Result;
use cmux_core::config::CmuxConfig;
use std::path::Path;

use crate::cli::manifest::Manifest;
use crate::cli::report;
use crate::cli::FetchArgs;

use super::fetch::fetch;

pub async fn run_manifest(cfg: &CmuxConfig, path: &Path, args: &FetchArgs) -> Result<()> {
    let manifest = Manifest::load(path)?;
    tracing::debug!(channels = manifest.channels.len(), "loaded manifest {}", path.display());
    let fetched = fetch(cfg, manifest.channels, args.threads).await?;
    report::finish(&fetched, &args.output_dir, args.json)
}
