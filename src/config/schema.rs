//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for (de)serialization from the JSON config file.

use serde::{Deserialize, Serialize};

/// Schemes assumed when `supportedProtocols` yields nothing usable.
pub const DEFAULT_PROTOCOLS: [&str; 2] = ["http", "https"];

/// Root configuration for the router.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Fallback program and process-wide settings.
    pub global: GlobalSettings,

    /// Routing rules, evaluated in order. The first match wins.
    pub rules: Vec<Rule>,
}

/// Global settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct GlobalSettings {
    /// Program launched when no rule matches or the matched rule fails.
    #[serde(alias = "fallbackProgram", alias = "defaultBrowserPath")]
    pub fallback_browser_path: String,

    /// Argument template for the fallback program.
    #[serde(alias = "fallbackArguments", alias = "defaultBrowserArgs")]
    pub fallback_browser_args: String,

    /// Program used to open the config file for editing.
    pub default_config_editor: String,

    /// Log file location. Empty disables file logging.
    pub log_path: String,

    /// Schemes this router is registered for (e.g. "https", "https://").
    pub supported_protocols: Vec<String>,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            fallback_browser_path: String::new(),
            fallback_browser_args: "{URL}".to_string(),
            default_config_editor: "notepad.exe".to_string(),
            log_path: String::new(),
            supported_protocols: DEFAULT_PROTOCOLS.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl GlobalSettings {
    /// Normalized, de-duplicated schemes, in configured order.
    ///
    /// Falls back to [`DEFAULT_PROTOCOLS`] when no entry is a valid scheme.
    pub fn protocols(&self) -> Vec<String> {
        let mut protocols: Vec<String> = Vec::new();
        for entry in &self.supported_protocols {
            if let Some(scheme) = normalize_protocol(entry) {
                if !protocols.contains(&scheme) {
                    protocols.push(scheme);
                }
            }
        }
        if protocols.is_empty() {
            protocols = DEFAULT_PROTOCOLS.iter().map(|p| p.to_string()).collect();
        }
        protocols
    }
}

/// A single routing rule.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Rule {
    /// Pattern searched for anywhere in the URL.
    pub regex: String,

    /// Program path. May contain `%NAME%` or `${NAME}` placeholders.
    pub program: String,

    /// Argument template with `$N` capture references and `{URL}`.
    pub arguments: String,
}

impl Rule {
    pub fn new(
        regex: impl Into<String>,
        program: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            regex: regex.into(),
            program: program.into(),
            arguments: arguments.into(),
        }
    }
}

/// Reduce a free-form protocol entry to its lower-cased scheme token.
///
/// `" HTTPS:// "` becomes `"https"`. Returns `None` when the entry does not
/// start with a scheme (RFC 3986: a letter, then letters, digits, `+`, `-`, `.`).
pub fn normalize_protocol(entry: &str) -> Option<String> {
    let entry = entry.trim();
    let mut chars = entry.char_indices();
    match chars.next() {
        Some((_, c)) if c.is_ascii_alphabetic() => {}
        _ => return None,
    }
    let end = chars
        .find(|(_, c)| !(c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')))
        .map(|(i, _)| i)
        .unwrap_or(entry.len());
    Some(entry[..end].to_ascii_lowercase())
}
