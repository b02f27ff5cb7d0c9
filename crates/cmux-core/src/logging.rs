//! Logging init: file under the XDG state dir, or stderr when that is not writable.

use anyhow::{anyhow, Context, Result};
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "info,cmux_core=debug,cmux=debug";

/// Where log output ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    File(PathBuf),
    Stderr,
}

/// Log file handle; each event gets its own clone, or stderr if cloning fails.
struct SharedLogFile(fs::File);

enum LogWriter {
    File(fs::File),
    Stderr,
}

impl io::Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            LogWriter::File(f) => f.write(buf),
            LogWriter::Stderr => io::stderr().lock().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            LogWriter::File(f) => f.flush(),
            LogWriter::Stderr => io::stderr().lock().flush(),
        }
    }
}

impl<'a> MakeWriter<'a> for SharedLogFile {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.0
            .try_clone()
            .map(LogWriter::File)
            .unwrap_or(LogWriter::Stderr)
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// `~/.local/state/cmux/cmux.log`.
pub fn log_file_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("cmux")?;
    Ok(xdg_dirs.get_state_home().join("cmux.log"))
}

/// Initialize structured logging to [`log_file_path`].
/// Returns Err when the file cannot be opened; callers then use [`init_logging_stderr`].
pub fn init_logging() -> Result<LogTarget> {
    let path = log_file_path()?;
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(BoxMakeWriter::new(SharedLogFile(file)))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!("logging already initialized: {}", e))?;

    tracing::info!("cmux logging initialized at {}", path.display());
    Ok(LogTarget::File(path))
}

/// Initialize logging to stderr only. A second initialization is ignored.
pub fn init_logging_stderr() -> LogTarget {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stderr)
        .with_ansi(false)
        .try_init();
    LogTarget::Stderr
}

/// File logging, falling back to stderr.
pub fn init() -> LogTarget {
    match init_logging() {
        Ok(target) => target,
        Err(e) => {
            let target = init_logging_stderr();
            tracing::warn!("file logging unavailable, using stderr: {:#}", e);
            target
        }
    }
}
