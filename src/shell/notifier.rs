//! User-facing notifications.

use crate::guard::PRODUCT_NAME;

/// Receives messages meant for the person who clicked the link.
pub trait Notifier: Send + Sync {
    /// A failure the user must see.
    fn report_error(&self, message: &str);

    /// Progress worth recording but not worth interrupting anyone for.
    fn log_event(&self, message: &str) {
        tracing::info!("{message}");
    }
}

/// Writes errors to stderr unless quiet; everything is also logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier {
    quiet: bool,
}

impl ConsoleNotifier {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }
}

impl Notifier for ConsoleNotifier {
    fn report_error(&self, message: &str) {
        tracing::error!("{message}");
        if !self.quiet {
            eprintln!("{PRODUCT_NAME} Error: {message}");
        }
    }
}

/// Shows errors in a message box; used when there is no console to write to.
#[cfg(windows)]
#[derive(Debug, Clone, Copy, Default)]
pub struct DialogNotifier {
    quiet: bool,
}

#[cfg(windows)]
impl DialogNotifier {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

#[cfg(windows)]
impl Notifier for DialogNotifier {
    fn report_error(&self, message: &str) {
        use windows_sys::Win32::UI::WindowsAndMessaging::{MessageBoxW, MB_ICONERROR, MB_TOPMOST};

        tracing::error!("{message}");
        if self.quiet {
            return;
        }
        let text = to_wide(message);
        let caption = to_wide(&format!("{PRODUCT_NAME} Error"));
        unsafe {
            MessageBoxW(
                std::ptr::null_mut(),
                text.as_ptr(),
                caption.as_ptr(),
                MB_ICONERROR | MB_TOPMOST,
            );
        }
    }
}

/// NUL-terminated UTF-16 for Win32 string parameters.
#[cfg_attr(not(windows), allow(dead_code))]
fn to_wide(value: &str) -> Vec<u16> {
    value.encode_utf16().chain(std::iter::once(0)).collect()
}
