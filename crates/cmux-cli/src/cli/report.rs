//! Writing fetched bodies to disk and printing the per-job report.

use anyhow::{bail, Context, Result};
use cmux_core::{checksum, naming};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use super::commands::FetchedJob;

/// One line of the report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportLine {
    pub channel: String,
    pub job: String,
    pub url: String,
    pub status: Option<u32>,
    pub attempts: u32,
    pub bytes: usize,
    pub elapsed_ms: Option<u128>,
    pub content_type: Option<String>,
    pub sha256: Option<String>,
    pub path: Option<PathBuf>,
    pub error: Option<String>,
}

/// Writes successful bodies to `<output_dir>/<channel>/<job>` and builds the report.
pub fn write_outputs(fetched: &[FetchedJob], output_dir: &Path) -> Result<Vec<ReportLine>> {
    let mut lines = Vec::with_capacity(fetched.len());
    for f in fetched {
        let o = &f.outcome;
        let mut line = ReportLine {
            channel: o.channel.clone(),
            job: o.name.clone(),
            url: o.url.clone(),
            status: o.response_code.or(f.head.status),
            attempts: o.attempts,
            bytes: o.body.len(),
            elapsed_ms: o.total_time.map(|d| d.as_millis()),
            content_type: f.head.content_type.clone(),
            sha256: None,
            path: None,
            error: o.error.clone(),
        };
        if o.is_success() {
            let dir = output_dir.join(naming::sanitize(&o.channel));
            fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
            let path = dir.join(&o.name);
            fs::write(&path, &o.body).with_context(|| format!("write {}", path.display()))?;
            line.sha256 = Some(checksum::sha256_bytes(&o.body));
            line.path = Some(path);
        }
        lines.push(line);
    }
    Ok(lines)
}

fn print_table(lines: &[ReportLine]) {
    println!(
        "{:<12} {:<24} {:<6} {:<10} {}",
        "CHANNEL", "JOB", "STATUS", "BYTES", "SHA256 / ERROR"
    );
    for l in lines {
        let status = l
            .status
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        let detail = match (&l.sha256, &l.error) {
            (_, Some(e)) => e.clone(),
            (Some(d), None) => d.clone(),
            (None, None) => "-".to_string(),
        };
        println!(
            "{:<12} {:<24} {:<6} {:<10} {}",
            l.channel, l.job, status, l.bytes, detail
        );
    }
}

/// Writes outputs, prints the report, and fails if any job failed.
pub fn finish(fetched: &[FetchedJob], output_dir: &Path, json: bool) -> Result<()> {
    let lines = write_outputs(fetched, output_dir)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&lines)?);
    } else {
        print_table(&lines);
    }
    let failed = lines.iter().filter(|l| l.error.is_some()).count();
    if failed > 0 {
        bail!("{} of {} jobs failed", failed, lines.len());
    }
    Ok(())
}
