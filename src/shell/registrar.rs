//! Protocol-handler registration.
//!
//! # Responsibilities
//! - Describe every registry key that makes this router a browser choice
//! - Hand that description to a `ShellRegistrar`
//!
//! # Design Decisions
//! - The plan is plain data; only registrars touch the OS
//! - Everything lives under HKEY_CURRENT_USER (no elevation needed)
//! - On Windows `RegistryRegistrar` writes the keys directly; the `.reg`
//!   renderer works everywhere and lets the change be reviewed first

use std::fmt::Write as _;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;

use crate::config::schema::normalize_protocol;
use crate::guard::PRODUCT_NAME;

const HIVE: &str = "HKEY_CURRENT_USER";
const DESCRIPTION: &str = "Smart link router with custom rules";

/// Errors from applying or removing a registration.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("failed to write registration: {0}")]
    Io(#[from] io::Error),
}

/// One named (or default, when `name` is `None`) string value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryValue {
    pub name: Option<String>,
    pub data: String,
}

impl RegistryValue {
    fn named(name: &str, data: impl Into<String>) -> Self {
        Self {
            name: Some(name.to_string()),
            data: data.into(),
        }
    }

    fn default_value(data: impl Into<String>) -> Self {
        Self {
            name: None,
            data: data.into(),
        }
    }
}

/// A key below HKEY_CURRENT_USER and the values set on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryKey {
    pub path: String,
    pub values: Vec<RegistryValue>,
}

/// Registry layout registering `exe` for `protocols`.
#[derive(Debug, Clone)]
pub struct RegistrationPlan {
    exe: PathBuf,
    protocols: Vec<String>,
}

impl RegistrationPlan {
    pub fn new(exe: impl Into<PathBuf>, protocols: &[String]) -> Self {
        let mut normalized: Vec<String> = Vec::new();
        for scheme in protocols.iter().filter_map(|p| normalize_protocol(p)) {
            if !normalized.contains(&scheme) {
                normalized.push(scheme);
            }
        }
        Self {
            exe: exe.into(),
            protocols: normalized,
        }
    }

    pub fn exe(&self) -> &Path {
        &self.exe
    }

    pub fn protocols(&self) -> &[String] {
        &self.protocols
    }

    fn client_key() -> String {
        format!(r"Software\Clients\StartMenuInternet\{PRODUCT_NAME}")
    }

    fn capabilities_key() -> String {
        format!(r"{}\Capabilities", Self::client_key())
    }

    fn html_class() -> String {
        format!("{PRODUCT_NAME}HTML")
    }

    fn html_class_key() -> String {
        format!(r"Software\Classes\{}", Self::html_class())
    }

    /// Open command: `"<exe>" "%1"`.
    pub fn open_command(&self) -> String {
        format!("\"{}\" \"%1\"", self.exe.display())
    }

    /// Keys and values to create, parents before children.
    pub fn keys(&self) -> Vec<RegistryKey> {
        let exe = self.exe.display().to_string();
        let mut keys = vec![
            RegistryKey {
                path: Self::client_key(),
                values: vec![
                    RegistryValue::named("DisplayName", PRODUCT_NAME),
                    RegistryValue::named("ApplicationName", PRODUCT_NAME),
                    RegistryValue::named("ApplicationDescription", DESCRIPTION),
                ],
            },
            RegistryKey {
                path: Self::capabilities_key(),
                values: vec![
                    RegistryValue::named("ApplicationName", PRODUCT_NAME),
                    RegistryValue::named("ApplicationIcon", format!("{exe},0")),
                    RegistryValue::named("ApplicationDescription", DESCRIPTION),
                ],
            },
            RegistryKey {
                path: format!(r"{}\URLAssociations", Self::capabilities_key()),
                values: self
                    .protocols
                    .iter()
                    .map(|scheme| RegistryValue::named(scheme, Self::html_class()))
                    .collect(),
            },
        ];

        for scheme in &self.protocols {
            keys.push(RegistryKey {
                path: format!(r"Software\Classes\{scheme}"),
                values: vec![
                    RegistryValue::default_value(format!("URL: {scheme} Protocol")),
                    RegistryValue::named("URL Protocol", ""),
                ],
            });
        }

        keys.push(RegistryKey {
            path: r"Software\RegisteredApplications".to_string(),
            values: vec![RegistryValue::named(PRODUCT_NAME, Self::capabilities_key())],
        });
        keys.push(RegistryKey {
            path: Self::html_class_key(),
            values: vec![RegistryValue::default_value(format!("{PRODUCT_NAME} Document"))],
        });
        keys.push(RegistryKey {
            path: format!(r"{}\shell\open\command", Self::html_class_key()),
            values: vec![RegistryValue::default_value(self.open_command())],
        });
        keys
    }

    /// Key trees deleted on unregistration.
    pub fn removal_keys(&self) -> Vec<String> {
        vec![Self::client_key(), Self::html_class_key()]
    }

    /// `(key, value name)` pairs deleted on unregistration.
    pub fn removal_values(&self) -> Vec<(String, String)> {
        vec![(
            r"Software\RegisteredApplications".to_string(),
            PRODUCT_NAME.to_string(),
        )]
    }
}

/// Applies or removes a registration with the OS shell.
pub trait ShellRegistrar {
    fn register(&self, plan: &RegistrationPlan) -> Result<(), RegistrationError>;
    fn unregister(&self, plan: &RegistrationPlan) -> Result<(), RegistrationError>;
}

/// Renders registrations as `.reg` scripts for `reg import`.
#[derive(Debug)]
pub struct RegFileRegistrar<W: Write> {
    out: Mutex<W>,
}

impl<W: Write> RegFileRegistrar<W> {
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

    fn emit(&self, script: &str) -> Result<(), RegistrationError> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| io::Error::other("registrar output lock poisoned"))?;
        out.write_all(script.as_bytes())?;
        out.flush()?;
        Ok(())
    }
}

impl<W: Write> ShellRegistrar for RegFileRegistrar<W> {
    fn register(&self, plan: &RegistrationPlan) -> Result<(), RegistrationError> {
        self.emit(&render_import(plan))
    }

    fn unregister(&self, plan: &RegistrationPlan) -> Result<(), RegistrationError> {
        self.emit(&render_removal(plan))
    }
}

/// Writes registrations straight into HKEY_CURRENT_USER.
#[cfg(windows)]
#[derive(Debug, Default, Clone, Copy)]
pub struct RegistryRegistrar;

#[cfg(windows)]
impl ShellRegistrar for RegistryRegistrar {
    fn register(&self, plan: &RegistrationPlan) -> Result<(), RegistrationError> {
        use winreg::enums::HKEY_CURRENT_USER;
        use winreg::RegKey;

        let hkcu = RegKey::predef(HKEY_CURRENT_USER);
        for key in plan.keys() {
            let (handle, _) = hkcu.create_subkey(&key.path)?;
            for value in &key.values {
                handle.set_value(value.name.as_deref().unwrap_or(""), &value.data)?;
            }
            tracing::debug!(key = %key.path, "Registry key written");
        }
        Ok(())
    }

    fn unregister(&self, plan: &RegistrationPlan) -> Result<(), RegistrationError> {
        use winreg::enums::{HKEY_CURRENT_USER, KEY_SET_VALUE};
        use winreg::RegKey;

        let hkcu = RegKey::predef(HKEY_CURRENT_USER);
        for key in plan.removal_keys() {
            ignore_missing(hkcu.delete_subkey_all(&key))?;
        }
        for (key, name) in plan.removal_values() {
            let handle = match hkcu.open_subkey_with_flags(&key, KEY_SET_VALUE) {
                Ok(handle) => handle,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            ignore_missing(handle.delete_value(&name))?;
        }
        Ok(())
    }
}

/// Deleting something already gone is success.
#[cfg_attr(not(windows), allow(dead_code))]
fn ignore_missing(result: io::Result<()>) -> io::Result<()> {
    match result {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

const REG_HEADER: &str = "Windows Registry Editor Version 5.00\r\n";

/// `.reg` script creating every key in the plan.
pub fn render_import(plan: &RegistrationPlan) -> String {
    let mut script = String::from(REG_HEADER);
    for key in plan.keys() {
        let _ = write!(script, "\r\n[{HIVE}\\{}]\r\n", key.path);
        for value in &key.values {
            let name = match &value.name {
                Some(name) => format!("\"{}\"", escape_reg(name)),
                None => "@".to_string(),
            };
            let _ = write!(script, "{name}=\"{}\"\r\n", escape_reg(&value.data));
        }
    }
    script
}

/// `.reg` script deleting what `render_import` creates.
pub fn render_removal(plan: &RegistrationPlan) -> String {
    let mut script = String::from(REG_HEADER);
    for key in plan.removal_keys() {
        let _ = write!(script, "\r\n[-{HIVE}\\{key}]\r\n");
    }
    for (key, name) in plan.removal_values() {
        let _ = write!(script, "\r\n[{HIVE}\\{key}]\r\n\"{}\"=-\r\n", escape_reg(&name));
    }
    script
}

fn escape_reg(text: &str) -> String {
    text.replace('\\', r"\\").replace('"', "\\\"")
}
