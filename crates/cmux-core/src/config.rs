use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::channel::TransferOptions;
use crate::retry::RetryPolicy;
use crate::scheduler::SchedulerOptions;

/// Per-transfer curl settings (optional `[transfer]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    pub connect_timeout_secs: u64,
    /// Abort a transfer slower than this many bytes/s for `low_speed_time_secs`.
    pub low_speed_limit: u32,
    pub low_speed_time_secs: u64,
    /// Hard timeout per transfer.
    pub timeout_secs: u64,
    pub max_redirections: u32,
    /// Per-transfer receive cap in bytes per second (None = no cap).
    pub max_recv_speed: Option<u64>,
    /// Receive buffer size in bytes (None = library default).
    pub buffer_size: Option<usize>,
    pub user_agent: Option<String>,
    /// Abort responses whose body grows past this many bytes.
    pub max_body_bytes: Option<u64>,
}

impl Default for TransferConfig {
    fn default() -> Self {
        let d = TransferOptions::default();
        Self {
            connect_timeout_secs: d.connect_timeout.as_secs(),
            low_speed_limit: d.low_speed_limit,
            low_speed_time_secs: d.low_speed_time.as_secs(),
            timeout_secs: d.timeout.as_secs(),
            max_redirections: d.max_redirections,
            max_recv_speed: None,
            buffer_size: None,
            user_agent: None,
            max_body_bytes: None,
        }
    }
}

/// Retry budget (optional `[retry]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per job (including the first).
    pub max_attempts: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: RetryPolicy::default().max_attempts,
        }
    }
}

/// Global configuration loaded from `~/.config/cmux/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CmuxConfig {
    /// Maximum jobs in flight across all channels.
    pub thread_limit: usize,
    /// Upper bound for one readiness wait, in milliseconds.
    #[serde(default = "default_wait_timeout_ms")]
    pub wait_timeout_ms: u64,
    /// Maximum connections libcurl opens to a single host.
    #[serde(default)]
    pub max_host_connections: Option<usize>,
    /// Maximum connections libcurl keeps open overall.
    #[serde(default)]
    pub max_total_connections: Option<usize>,
    /// Multiplex transfers over HTTP/2 connections where possible.
    #[serde(default = "default_multiplex")]
    pub multiplex: bool,
    #[serde(default)]
    pub transfer: TransferConfig,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

fn default_wait_timeout_ms() -> u64 {
    1000
}

fn default_multiplex() -> bool {
    true
}

impl Default for CmuxConfig {
    fn default() -> Self {
        Self {
            thread_limit: 8,
            wait_timeout_ms: default_wait_timeout_ms(),
            max_host_connections: None,
            max_total_connections: None,
            multiplex: default_multiplex(),
            transfer: TransferConfig::default(),
            retry: None,
        }
    }
}

impl CmuxConfig {
    pub fn scheduler_options(&self) -> SchedulerOptions {
        SchedulerOptions {
            thread_limit: self.thread_limit,
            wait_timeout: Duration::from_millis(self.wait_timeout_ms.max(1)),
            max_host_connections: self.max_host_connections,
            max_total_connections: self.max_total_connections,
            multiplex: self.multiplex,
        }
    }

    pub fn transfer_options(&self) -> TransferOptions {
        let t = &self.transfer;
        TransferOptions {
            connect_timeout: Duration::from_secs(t.connect_timeout_secs),
            low_speed_limit: t.low_speed_limit,
            low_speed_time: Duration::from_secs(t.low_speed_time_secs),
            timeout: Duration::from_secs(t.timeout_secs),
            max_redirections: t.max_redirections,
            max_recv_speed: t.max_recv_speed,
            buffer_size: t.buffer_size,
            user_agent: t.user_agent.clone(),
            max_body_bytes: t.max_body_bytes,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
            .as_ref()
            .map(|r| RetryPolicy {
                max_attempts: r.max_attempts.max(1),
            })
            .unwrap_or_default()
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("cmux")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<CmuxConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = CmuxConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from(&path)
}

/// Load configuration from an explicit path; the file must exist.
pub fn load_from(path: &Path) -> Result<CmuxConfig> {
    let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: CmuxConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}
