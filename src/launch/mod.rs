//! Process launch subsystem.
//!
//! # Data Flow
//! ```text
//! Resolved candidate (program path, expanded arguments)
//!     → command_line.rs (CommandLine: "<program>" <arguments>)
//!     → Launcher impl:
//!         - launcher.rs ProcessLauncher (detached child process)
//!         - launcher.rs DryRunLauncher (print only)
//!     → Ok, or a recoverable LaunchError
//! ```
//!
//! # Design Decisions
//! - Fire-and-forget: no waiting, no output capture
//! - Launch failure is an ordinary error value; the dispatcher decides
//!   whether another candidate is tried

pub mod command_line;
pub mod launcher;

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub use command_line::CommandLine;
pub use launcher::{DryRunLauncher, ProcessLauncher};

/// Starts a program from a prepared command line.
pub trait Launcher: Send + Sync {
    fn launch(&self, command: &CommandLine) -> Result<(), LaunchError>;
}

/// Errors that can occur while starting a process.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Executable does not exist.
    #[error("program not found: {}", .program.display())]
    NotFound { program: PathBuf },

    /// Executable exists but may not be run.
    #[error("permission denied: {}", .program.display())]
    PermissionDenied { program: PathBuf },

    /// Any other OS failure.
    #[error("failed to start {}: {source}", .program.display())]
    Io {
        program: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl LaunchError {
    pub fn from_io(program: &Path, source: io::Error) -> Self {
        let program = program.to_path_buf();
        match source.kind() {
            io::ErrorKind::NotFound => LaunchError::NotFound { program },
            io::ErrorKind::PermissionDenied => LaunchError::PermissionDenied { program },
            _ => LaunchError::Io { program, source },
        }
    }
}
