//! Rule matching logic.
//!
//! # Responsibilities
//! - Evaluate rules against a URL in configured order
//! - Extract the full match and capture groups of the winning rule
//!
//! # Design Decisions
//! - First match wins; later rules are never compiled once one matches
//! - Patterns search anywhere in the URL (not anchored unless the rule says so)
//! - A pattern that fails to compile is logged and skipped, never fatal
//! - No match is an ordinary result, not an error

use regex::Regex;

use crate::config::schema::Rule;

/// Outcome of matching a URL against the rule list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult<'a> {
    /// Winning rule, if any.
    pub rule: Option<&'a Rule>,
    /// Position of the winning rule in the rule list.
    pub rule_index: Option<usize>,
    /// `$0` is the whole match, `$1..` the groups. Groups that did not
    /// participate are empty strings.
    pub captures: Vec<String>,
}

impl<'a> MatchResult<'a> {
    pub fn no_match() -> Self {
        Self {
            rule: None,
            rule_index: None,
            captures: Vec::new(),
        }
    }

    pub fn is_match(&self) -> bool {
        self.rule.is_some()
    }
}

/// Evaluates routing rules in priority order.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleMatcher;

impl RuleMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Return the first rule whose pattern matches any substring of `url`.
    pub fn find_match<'a>(&self, rules: &'a [Rule], url: &str) -> MatchResult<'a> {
        for (index, rule) in rules.iter().enumerate() {
            let re = match Regex::new(&rule.regex) {
                Ok(re) => re,
                Err(e) => {
                    tracing::warn!(
                        rule = index,
                        regex = %rule.regex,
                        error = %e,
                        "Invalid regex, skipping rule"
                    );
                    continue;
                }
            };

            if let Some(caps) = re.captures(url) {
                let captures = caps
                    .iter()
                    .map(|group| group.map(|m| m.as_str().to_string()).unwrap_or_default())
                    .collect();
                return MatchResult {
                    rule: Some(rule),
                    rule_index: Some(index),
                    captures,
                };
            }
        }

        MatchResult::no_match()
    }
}

/// Render capture groups for logs: `$0="…", $1="…"`.
pub fn format_captures(captures: &[String]) -> String {
    captures
        .iter()
        .enumerate()
        .map(|(i, group)| format!("${i}={group:?}"))
        .collect::<Vec<_>>()
        .join(", ")
}
