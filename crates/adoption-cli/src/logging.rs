use crate::args::LogLevel;
use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::fmt::time::{ChronoLocal, ChronoUtc, FormatTime};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

// Timestamp format: 2026-02-14 19:44:09.123 -08:00
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f %:z";

/// Path of the log file for binary `app`: `<log_dir>/<app>.log`.
pub fn log_file_path(log_dir: &Path, app: &str) -> PathBuf {
    log_dir.join(format!("{app}.log"))
}

/// Open (or create) the log file in append mode, creating `log_dir` first.
pub fn open_log_file(log_dir: &Path, app: &str) -> Result<(File, PathBuf)> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;
    let path = log_file_path(log_dir, app);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;
    Ok((file, path))
}

/// Send logs to the console and, without ANSI colors, to
/// `<log_dir>/<app>.log`. `RUST_LOG` overrides `level`.
pub fn init(level: LogLevel, utc: bool, log_dir: &Path, app: &str) -> Result<PathBuf> {
    let (file, path) = open_log_file(log_dir, app)?;
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.directive()));

    if utc {
        install(env_filter, file, ChronoUtc::new(TIME_FORMAT.to_string()))?;
    } else {
        install(env_filter, file, ChronoLocal::new(TIME_FORMAT.to_string()))?;
    }
    Ok(path)
}

fn install<T>(env_filter: EnvFilter, file: File, timer: T) -> Result<()>
where
    T: FormatTime + Clone + Send + Sync + 'static,
{
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_timer(timer.clone()))
        .with(
            fmt::layer()
                .with_timer(timer)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()
        .context("Failed to install tracing subscriber")
}
