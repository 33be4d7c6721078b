//! Process launchers.

use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::sync::Mutex;

use crate::launch::command_line::CommandLine;
use crate::launch::{LaunchError, Launcher};

/// Starts the target as a detached child process.
///
/// The child's stdio is closed and it is never waited on; it outlives the
/// router.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessLauncher;

impl ProcessLauncher {
    pub fn new() -> Self {
        Self
    }

    fn build(command: &CommandLine) -> Command {
        let mut cmd = Command::new(command.program());
        append_arguments(&mut cmd, command);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        cmd
    }
}

#[cfg(windows)]
fn append_arguments(cmd: &mut Command, command: &CommandLine) {
    use std::os::windows::process::CommandExt;

    // The program is quoted by std; the argument text goes through untouched.
    if !command.arguments().is_empty() {
        cmd.raw_arg(command.arguments());
    }
}

#[cfg(not(windows))]
fn append_arguments(cmd: &mut Command, command: &CommandLine) {
    cmd.args(command.argv());
}

impl Launcher for ProcessLauncher {
    fn launch(&self, command: &CommandLine) -> Result<(), LaunchError> {
        tracing::info!(command_line = %command, "Launching");
        Self::build(command)
            .spawn()
            .map(drop)
            .map_err(|source| LaunchError::from_io(command.program(), source))
    }
}

/// Prints the command line instead of starting anything.
#[derive(Debug)]
pub struct DryRunLauncher<W: Write + Send> {
    out: Mutex<W>,
}

impl<W: Write + Send> DryRunLauncher<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W: Write + Send> Launcher for DryRunLauncher<W> {
    fn launch(&self, command: &CommandLine) -> Result<(), LaunchError> {
        let io_err = |source| LaunchError::from_io(command.program(), source);
        let mut out = self
            .out
            .lock()
            .map_err(|_| io_err(io::Error::other("dry-run output lock poisoned")))?;
        writeln!(out, "{command}").map_err(io_err)?;
        for (i, arg) in command.argv().iter().enumerate() {
            writeln!(out, "  argv[{}] = {arg:?}", i + 1).map_err(io_err)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program_is_recoverable() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no-such-program.exe");

        let err = ProcessLauncher::new()
            .launch(&CommandLine::new(&missing, "https://example.com"))
            .unwrap_err();

        assert!(matches!(err, LaunchError::NotFound { .. }));
        assert!(err.to_string().contains("no-such-program.exe"));
    }

    #[test]
    fn test_dry_run_prints_command_and_argv() {
        let launcher = DryRunLauncher::new(Vec::new());

        launcher
            .launch(&CommandLine::new(r"C:\MusicApp\app.exe", r#"play "a b""#))
            .unwrap();

        let printed = String::from_utf8(launcher.into_inner()).unwrap();
        assert_eq!(
            printed,
            "\"C:\\MusicApp\\app.exe\" play \"a b\"\n  argv[1] = \"play\"\n  argv[2] = \"a b\"\n"
        );
    }
}
