//! Tracing setup: a timestamped session log file and optional stderr output

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::CliError;

const CRATES: [&str; 4] = ["ffbsim", "ffbsim_session", "ffbsim_ffb", "ffbsim_errors"];

#[derive(Debug, Clone)]
pub struct LogOptions {
    pub verbose: u8,
    pub stderr: bool,
    pub file: bool,
    pub directory: PathBuf,
}

/// Keeps the file writer alive; logs the end banner when dropped.
pub struct LogGuard {
    path: Option<PathBuf>,
    _worker: Option<WorkerGuard>,
}

impl LogGuard {
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl Drop for LogGuard {
    fn drop(&mut self) {
        info!(ended = %Local::now().format("%Y-%m-%d %H:%M:%S"), "==== Session ended ====");
    }
}

/// `ffbsim_YYYYMMDD_HHMMSS.log`
pub fn log_filename(at: DateTime<Local>) -> String {
    at.format("ffbsim_%Y%m%d_%H%M%S.log").to_string()
}

pub fn level_for(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

fn default_directives(verbose: u8) -> String {
    let level = level_for(verbose);
    CRATES
        .iter()
        .map(|krate| format!("{krate}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Installs the global subscriber. `RUST_LOG` overrides the `-v` level.
pub fn init(options: &LogOptions) -> Result<LogGuard, CliError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(options.verbose)));

    let mut path = None;
    let mut worker = None;
    let file_layer = if options.file {
        std::fs::create_dir_all(&options.directory)?;
        let started = Local::now();
        let name = log_filename(started);
        let appender = RollingFileAppender::builder()
            .rotation(Rotation::NEVER)
            .filename_prefix(&name)
            .build(&options.directory)
            .map_err(|e| CliError::Logging(format!("cannot create {name}: {e}")))?;
        let (writer, guard) = tracing_appender::non_blocking(appender);
        path = Some(options.directory.join(name));
        worker = Some(guard);
        Some(fmt::layer().with_writer(writer).with_ansi(false))
    } else {
        None
    };

    let stderr_layer = options
        .stderr
        .then(|| fmt::layer().with_writer(std::io::stderr).with_target(false));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| CliError::Logging(e.to_string()))?;

    info!(
        started = %Local::now().format("%Y-%m-%d %H:%M:%S"),
        version = env!("CARGO_PKG_VERSION"),
        "==== Session started ===="
    );

    Ok(LogGuard {
        path,
        _worker: worker,
    })
}
