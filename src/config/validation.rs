//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check every rule pattern compiles
//! - Flag rules and settings that can never launch anything
//!
//! # Design Decisions
//! - Returns all validation issues, not just first
//! - Validation is pure function: Config → Vec<ValidationIssue>
//! - Nothing here is fatal: a broken rule is skipped at dispatch time,
//!   so issues are warnings for the log and for `--check`

use std::fmt;

use regex::Regex;

use crate::config::schema::{normalize_protocol, Config};

/// A single problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    /// Rule pattern does not compile; the rule never matches.
    InvalidRegex { index: usize, message: String },
    /// Rule pattern is empty and therefore matches every URL.
    EmptyRegex { index: usize },
    /// Rule has no program to launch.
    EmptyProgram { index: usize },
    /// Protocol entry does not start with a scheme.
    UnrecognizedProtocol { entry: String },
    /// No fallback program; unmatched URLs cannot be opened.
    NoFallback,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::InvalidRegex { index, message } => {
                write!(f, "rule #{index}: invalid regex: {message}")
            }
            ValidationIssue::EmptyRegex { index } => {
                write!(f, "rule #{index}: empty regex matches every URL")
            }
            ValidationIssue::EmptyProgram { index } => {
                write!(f, "rule #{index}: program path is empty")
            }
            ValidationIssue::UnrecognizedProtocol { entry } => {
                write!(f, "supported protocol {entry:?} is not a valid scheme")
            }
            ValidationIssue::NoFallback => write!(f, "fallback browser path is empty"),
        }
    }
}

/// Collect every issue in `config`.
pub fn validate_config(config: &Config) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for (index, rule) in config.rules.iter().enumerate() {
        if rule.regex.is_empty() {
            issues.push(ValidationIssue::EmptyRegex { index });
        } else if let Err(e) = Regex::new(&rule.regex) {
            issues.push(ValidationIssue::InvalidRegex {
                index,
                message: e.to_string(),
            });
        }
        if rule.program.trim().is_empty() {
            issues.push(ValidationIssue::EmptyProgram { index });
        }
    }

    for entry in &config.global.supported_protocols {
        if normalize_protocol(entry).is_none() {
            issues.push(ValidationIssue::UnrecognizedProtocol {
                entry: entry.clone(),
            });
        }
    }

    if config.global.fallback_browser_path.trim().is_empty() {
        issues.push(ValidationIssue::NoFallback);
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::Rule;

    fn config_with_rules(rules: Vec<Rule>) -> Config {
        let mut config = Config::default();
        config.global.fallback_browser_path = r"C:\Browser\b.exe".to_string();
        config.rules = rules;
        config
    }

    #[test]
    fn test_valid_config_has_no_issues() {
        let config = config_with_rules(vec![Rule::new(r"^https://music\.", "app.exe", "play $0")]);
        assert!(validate_config(&config).is_empty());
    }

    #[test]
    fn test_reports_all_rule_issues() {
        let config = config_with_rules(vec![
            Rule::new("(unclosed", "a.exe", ""),
            Rule::new("", "b.exe", ""),
            Rule::new("ok", "  ", ""),
        ]);
        let issues = validate_config(&config);

        assert_eq!(issues.len(), 3);
        assert!(matches!(issues[0], ValidationIssue::InvalidRegex { index: 0, .. }));
        assert_eq!(issues[1], ValidationIssue::EmptyRegex { index: 1 });
        assert_eq!(issues[2], ValidationIssue::EmptyProgram { index: 2 });
    }

    #[test]
    fn test_reports_global_issues() {
        let mut config = Config::default();
        config.global.supported_protocols = vec!["https".into(), "//bad".into()];
        let issues = validate_config(&config);

        assert_eq!(
            issues,
            vec![
                ValidationIssue::UnrecognizedProtocol {
                    entry: "//bad".into()
                },
                ValidationIssue::NoFallback,
            ]
        );
        assert_eq!(issues[1].to_string(), "fallback browser path is empty");
    }
}
