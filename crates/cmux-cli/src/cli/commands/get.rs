//! `cmux get` – fetch URLs through one channel.

use anyhow::Result;
use cmux_core::config::CmuxConfig;
use std::collections::HashMap;

use crate::cli::manifest::ChannelSpec;
use crate::cli::report;
use crate::cli::FetchArgs;

use super::fetch::fetch;

pub async fn run_get(
    cfg: &CmuxConfig,
    name: String,
    priority: f64,
    urls: Vec<String>,
    args: &FetchArgs,
) -> Result<()> {
    let channel = ChannelSpec {
        name,
        priority,
        urls,
        headers: HashMap::new(),
    };
    let fetched = fetch(cfg, vec![channel], args.threads).await?;
    report::finish(&fetched, &args.output_dir, args.json)
}
