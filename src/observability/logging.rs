//! Structured logging.
//!
//! # Responsibilities
//! - Initialize logging subsystem
//! - Resolve the configured log file
//! - Configure log level from the environment
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - File output when `logPath` is set (append, no ANSI), stderr otherwise
//! - Log level from `RUST_LOG`, defaulting to info for this crate

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::env::expand_env;

/// Where log output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

/// Turn the configured `logPath` into a target.
///
/// Placeholders are expanded; a relative path is taken relative to
/// `base_dir` (the executable's directory).
pub fn resolve_log_target(log_path: &str, base_dir: &Path) -> LogTarget {
    if log_path.trim().is_empty() {
        return LogTarget::Stderr;
    }
    let expanded = PathBuf::from(expand_env(log_path.trim()));
    if expanded.is_absolute() {
        LogTarget::File(expanded)
    } else {
        LogTarget::File(base_dir.join(expanded))
    }
}

fn default_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            "link_router=debug".into()
        } else {
            "link_router=info".into()
        }
    })
}

/// Install the global subscriber.
///
/// When the log file cannot be opened, stderr is used instead and the
/// error is returned so the caller can report it.
pub fn init_logging(target: &LogTarget, verbose: bool) -> io::Result<()> {
    let file = match target {
        LogTarget::Stderr => None,
        LogTarget::File(path) => Some(open_log_file(path)),
    };

    match file {
        Some(Ok(file)) => {
            tracing_subscriber::registry()
                .with(default_filter(verbose))
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .init();
            Ok(())
        }
        Some(Err(e)) => {
            init_stderr(verbose);
            Err(e)
        }
        None => {
            init_stderr(verbose);
            Ok(())
        }
    }
}

fn init_stderr(verbose: bool) {
    tracing_subscriber::registry()
        .with(default_filter(verbose))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn open_log_file(path: &Path) -> io::Result<fs::File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
