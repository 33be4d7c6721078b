//! Default browser discovery for freshly written configs.
//!
//! On Windows the user's https handler is read from the registry
//! (`UrlAssociations\https\UserChoice` ProgId, then that class's open
//! command). Other platforms report nothing and the caller falls back to
//! well-known install paths.

use std::path::Path;

#[cfg(windows)]
const USER_CHOICE_KEY: &str =
    r"Software\Microsoft\Windows\Shell\Associations\UrlAssociations\https\UserChoice";

/// Executable of the user's default https handler, if one can be found.
#[cfg(windows)]
pub fn detect_default_browser() -> Option<String> {
    use winreg::enums::{HKEY_CLASSES_ROOT, HKEY_CURRENT_USER};
    use winreg::RegKey;

    let user_choice = RegKey::predef(HKEY_CURRENT_USER)
        .open_subkey(USER_CHOICE_KEY)
        .ok()?;
    let prog_id: String = user_choice.get_value("ProgId").ok()?;
    if prog_id.trim().is_empty() {
        return None;
    }

    let command: String = RegKey::predef(HKEY_CLASSES_ROOT)
        .open_subkey(format!(r"{}\shell\open\command", prog_id.trim()))
        .and_then(|key| key.get_value(""))
        .ok()?;
    tracing::debug!(%prog_id, %command, "Default https handler");
    parse_open_command(&command)
}

#[cfg(not(windows))]
pub fn detect_default_browser() -> Option<String> {
    None
}

/// Executable path of a shell open command such as `"C:\b.exe" -- "%1"`.
///
/// Commands that go through `cmd.exe` are rejected.
pub fn parse_open_command(command: &str) -> Option<String> {
    let command = command.trim();
    if command.to_ascii_lowercase().contains("cmd.exe") {
        return None;
    }
    if let Some(rest) = command.strip_prefix('"') {
        if let Some((program, _)) = rest.split_once('"') {
            return Some(program.to_string()).filter(|p| !p.is_empty());
        }
    }
    command.split_whitespace().next().map(str::to_string)
}

/// Fallback browser for a new config.
///
/// The detected handler wins unless `is_self` says it is this router;
/// otherwise the first existing path in `candidates` is used.
pub fn pick_fallback_browser<F>(
    detected: Option<String>,
    is_self: F,
    candidates: &[&str],
) -> String
where
    F: Fn(&Path) -> bool,
{
    if let Some(path) = detected.filter(|p| !p.trim().is_empty()) {
        if !is_self(Path::new(&path)) {
            return path;
        }
        tracing::warn!(%path, "Default browser is this router, ignoring it");
    }
    candidates
        .iter()
        .find(|candidate| Path::new(candidate).is_file())
        .map(|candidate| candidate.to_string())
        .unwrap_or_default()
}
