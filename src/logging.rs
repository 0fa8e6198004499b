//! File logging for a single updater run.
//!
//! The binary runs once per invocation, so there is no long-lived process
//! to rotate logs for. Instead, [`init`] writes one timestamped file under
//! `~/.plugup/logs/` per run and sweeps files older than the configured
//! retention on the way in. The directory needs no other maintenance.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

pub const DEFAULT_LOG_RETENTION_HOURS: u32 = 24;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// File-logging settings read from the config file.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// How long run logs are kept before the sweep removes them.
    pub retention_hours: u32,
    /// Filter directive passed to the subscriber (trace .. error, off).
    pub level: String,
    /// Master switch; `false` skips file logging entirely.
    pub enabled: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            retention_hours: DEFAULT_LOG_RETENTION_HOURS,
            level: DEFAULT_LOG_LEVEL.to_string(),
            enabled: true,
        }
    }
}

impl LogConfig {
    /// Normalizes a level name from the config file.
    ///
    /// Unknown names fall back to the default so a typo in one setting
    /// does not fail the whole config load.
    #[must_use]
    pub fn parse_level(value: &str) -> String {
        let level = value.trim().to_ascii_lowercase();
        match level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" | "off" => level,
            "warning" => "warn".to_string(),
            "none" | "disabled" => "off".to_string(),
            _ => DEFAULT_LOG_LEVEL.to_string(),
        }
    }

    /// Parses a retention value, falling back to the default on garbage.
    #[must_use]
    pub fn parse_retention(value: &str) -> u32 {
        value.trim().parse().unwrap_or(DEFAULT_LOG_RETENTION_HOURS)
    }

    fn retention(&self) -> Duration {
        Duration::from_secs(u64::from(self.retention_hours) * 3600)
    }
}

/// Log directory, `~/.plugup/logs`.
#[must_use]
pub fn log_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".plugup")
        .join("logs")
}

/// Path for this run's log file, named after the start time.
fn run_log_path(dir: &Path) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    dir.join(format!("run-{stamp}.log"))
}

/// Deletes `.log` files in `dir` older than `max_age`, leaving everything
/// else alone. A file whose age cannot be read is treated as fresh.
fn sweep_stale(dir: &Path, max_age: Duration) -> io::Result<usize> {
    let now = SystemTime::now();
    let mut swept = 0;

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_none_or(|ext| ext != "log") {
            continue;
        }
        let expired = fs::metadata(&path)
            .and_then(|meta| meta.modified())
            .ok()
            .and_then(|modified| now.duration_since(modified).ok())
            .is_some_and(|age| age > max_age);
        if expired && fs::remove_file(&path).is_ok() {
            swept += 1;
        }
    }

    Ok(swept)
}

/// Starts file logging for this run and sweeps leftovers from earlier
/// runs. A disabled config, or level `off`, is a no-op.
///
/// # Errors
/// Fails when the log directory or the run's log file cannot be created,
/// or when the sweep cannot read the directory.
pub fn init(config: &LogConfig) -> io::Result<()> {
    if !config.enabled || config.level == "off" {
        return Ok(());
    }

    let dir = log_directory();
    fs::create_dir_all(&dir)?;
    let swept = sweep_stale(&dir, config.retention())?;

    let path = run_log_path(&dir);
    let file = File::create(&path)?;

    // RUST_LOG wins over the config file when set.
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(file.with_max_level(tracing::Level::TRACE))
                .with_ansi(false),
        )
        .init();

    tracing::info!(
        "Logging to {} at level {} (retention {}h)",
        path.display(),
        config.level,
        config.retention_hours
    );
    if swept > 0 {
        tracing::debug!("Swept {} expired log file(s)", swept);
    }

    Ok(())
}
