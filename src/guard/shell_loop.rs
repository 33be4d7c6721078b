//! Shell-loop detection.
//!
//! Handing a URL to the Windows shell makes the OS look up the registered
//! handler for its scheme. When that handler is this router, the URL comes
//! straight back and the dispatch never ends.

use std::path::Path;

use regex::Regex;

use crate::config::schema::normalize_protocol;

/// File name of the Windows file-explorer shell.
pub const SHELL_EXECUTABLE: &str = "explorer.exe";

/// Last component of a path, splitting on both `\` and `/`.
///
/// `Path::file_name` only knows the host separator, which would keep
/// `C:\Windows\explorer.exe` whole on non-Windows hosts.
pub fn windows_file_name(path: &str) -> &str {
    path.rsplit(['\\', '/']).next().unwrap_or(path)
}

/// True when `program` is the shell, with or without its extension.
pub fn is_shell(program: &Path) -> bool {
    let lossy = program.to_string_lossy();
    let name = windows_file_name(&lossy);
    name.eq_ignore_ascii_case(SHELL_EXECUTABLE)
        || name.eq_ignore_ascii_case(SHELL_EXECUTABLE.trim_end_matches(".exe"))
}

/// First supported scheme that appears as `scheme:` at the start of the
/// arguments or after whitespace, optionally behind an opening quote.
pub fn find_scheme_reference(arguments: &str, protocols: &[String]) -> Option<String> {
    protocols
        .iter()
        .filter_map(|entry| normalize_protocol(entry))
        .find(|scheme| {
            let pattern = format!(r#"(?i)(?:^|\s)["']?{}:"#, regex::escape(scheme));
            Regex::new(&pattern)
                .map(|re| re.is_match(arguments))
                .unwrap_or(false)
        })
}

/// True when launching `program` with `arguments` would hand a URL of a
/// scheme we handle back to the OS shell.
pub fn would_recurse_through_shell(program: &Path, arguments: &str, protocols: &[String]) -> bool {
    is_shell(program) && find_scheme_reference(arguments, protocols).is_some()
}
