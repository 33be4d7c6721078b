//! Configuration loading from disk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::browser::{detect_default_browser, pick_fallback_browser};
use crate::config::schema::{Config, GlobalSettings};
use crate::guard::{ExecutableIdentity, SelfIdentityGuard};

/// File name of the configuration file.
pub const CONFIG_FILE_NAME: &str = "linkrouter.json";

/// Directory created under the local data dir.
pub const APP_DIR_NAME: &str = "LinkRouter";

/// Browser installs probed when writing a fresh config.
const FALLBACK_BROWSER_CANDIDATES: [&str; 2] = [
    r"C:\Program Files (x86)\Microsoft\Edge\Application\msedge.exe",
    r"C:\Program Files\Microsoft\Edge\Application\msedge.exe",
];

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// How a loaded configuration came to be.
#[derive(Debug)]
pub enum ConfigOrigin {
    /// Read from an existing file.
    File,
    /// No file existed; the defaults were written to disk.
    CreatedDefault,
    /// No file existed and writing the defaults failed.
    DefaultNotSaved(ConfigError),
}

impl ConfigOrigin {
    /// Record the origin once a subscriber is installed.
    pub fn log(&self, path: &Path) {
        match self {
            ConfigOrigin::File => {
                tracing::debug!(path = %path.display(), "Loaded configuration")
            }
            ConfigOrigin::CreatedDefault => {
                tracing::info!(path = %path.display(), "Wrote default configuration")
            }
            ConfigOrigin::DefaultNotSaved(e) => {
                tracing::warn!(error = %e, "Could not write default configuration")
            }
        }
    }
}

/// Load configuration from a JSON file.
///
/// A missing file is not an error: a default configuration is written to
/// `path` (best effort) and returned.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let (config, origin) = load_config_with_origin(path)?;
    origin.log(path);
    Ok(config)
}

/// Like [`load_config`], but hands back what happened instead of logging it.
pub fn load_config_with_origin(path: &Path) -> Result<(Config, ConfigOrigin), ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            let config = default_config();
            let origin = match save_config(&config, path) {
                Ok(()) => ConfigOrigin::CreatedDefault,
                Err(e) => ConfigOrigin::DefaultNotSaved(e),
            };
            return Ok((config, origin));
        }
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let config = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok((config, ConfigOrigin::File))
}

/// Write configuration as pretty-printed JSON, creating parent directories.
pub fn save_config(config: &Config, path: &Path) -> Result<(), ConfigError> {
    let write_err = |source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    let json = serde_json::to_string_pretty(config)
        .map_err(|e| write_err(io::Error::new(io::ErrorKind::InvalidData, e)))?;
    fs::write(path, json).map_err(write_err)
}

/// Configuration written when none exists yet.
///
/// The fallback is the user's current default browser, unless that is
/// this router, else the first Microsoft Edge install found.
pub fn default_config() -> Config {
    let guard = ExecutableIdentity::current().ok().map(SelfIdentityGuard::new);
    let fallback = pick_fallback_browser(
        detect_default_browser(),
        |path| guard.as_ref().is_some_and(|guard| guard.is_self(path)),
        &FALLBACK_BROWSER_CANDIDATES,
    );

    Config {
        global: GlobalSettings {
            fallback_browser_path: fallback,
            ..GlobalSettings::default()
        },
        rules: Vec::new(),
    }
}

/// Locate the configuration file for this executable.
pub fn resolve_config_path() -> PathBuf {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."));
    resolve_config_path_in(&exe_dir, dirs::data_local_dir().as_deref())
}

/// Lookup order: existing file in the local data dir, existing file next to
/// the executable, next to the executable if writable, else the data dir.
pub fn resolve_config_path_in(exe_dir: &Path, data_local_dir: Option<&Path>) -> PathBuf {
    let beside_exe = exe_dir.join(CONFIG_FILE_NAME);
    let Some(data_local_dir) = data_local_dir else {
        return beside_exe;
    };
    let in_app_data = data_local_dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME);

    if in_app_data.is_file() {
        return in_app_data;
    }
    if beside_exe.is_file() || is_dir_writable(exe_dir) {
        return beside_exe;
    }
    in_app_data
}

fn is_dir_writable(dir: &Path) -> bool {
    let probe = dir.join(".linkrouter-write-probe");
    match fs::OpenOptions::new().create(true).append(true).open(&probe) {
        Ok(_) => {
            let _ = fs::remove_file(&probe);
            true
        }
        Err(_) => false,
    }
}
