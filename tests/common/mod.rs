//! Shared utilities for integration tests.

use std::path::Path;
use std::sync::Mutex;

use link_router::config::Config;
use link_router::guard::{ExecutableIdentity, SelfIdentityGuard, PRODUCT_NAME};
use link_router::launch::{CommandLine, LaunchError, Launcher};
use link_router::shell::Notifier;

/// Launcher that records every command line instead of spawning.
///
/// Programs listed in `missing` fail with `NotFound`.
#[derive(Default)]
pub struct RecordingLauncher {
    pub launched: Mutex<Vec<CommandLine>>,
    pub missing: Vec<String>,
}

#[allow(dead_code)]
impl RecordingLauncher {
    pub fn with_missing(missing: &[&str]) -> Self {
        Self {
            launched: Mutex::new(Vec::new()),
            missing: missing.iter().map(|m| m.to_string()).collect(),
        }
    }

    pub fn commands(&self) -> Vec<String> {
        self.launched
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.to_string())
            .collect()
    }
}

impl Launcher for RecordingLauncher {
    fn launch(&self, command: &CommandLine) -> Result<(), LaunchError> {
        self.launched.lock().unwrap().push(command.clone());
        let program = command.program().to_string_lossy();
        if self.missing.iter().any(|m| *m == program) {
            return Err(LaunchError::NotFound {
                program: command.program().to_path_buf(),
            });
        }
        Ok(())
    }
}

/// Notifier that keeps every message.
#[derive(Default)]
pub struct RecordingNotifier {
    pub errors: Mutex<Vec<String>>,
    pub events: Mutex<Vec<String>>,
}

impl Notifier for RecordingNotifier {
    fn report_error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }

    fn log_event(&self, message: &str) {
        self.events.lock().unwrap().push(message.to_string());
    }
}

/// Parse a config the way it is stored on disk.
pub fn config_from_json(json: &str) -> Config {
    serde_json::from_str(json).expect("test config must parse")
}

/// Guard whose "own executable" is `path`.
pub fn guard_for(path: impl AsRef<Path>) -> SelfIdentityGuard {
    SelfIdentityGuard::new(ExecutableIdentity::new(path.as_ref(), PRODUCT_NAME))
}
