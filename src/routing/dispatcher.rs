//! URL dispatch.
//!
//! # States
//! ```text
//! Start → Matching → Expanding → GuardChecking → Launching → Done
//!            │            ↑                 │           │
//!            │ no match   │                 └─ reject ──┴─ fail
//!            ▼            │                        │
//!         Fallback ───────┘ (fallback candidate)   ▼
//!            │                          rule candidate → Fallback
//!            └─ empty fallback path     fallback candidate → Failed
//!                     → Failed
//! ```
//!
//! # Design Decisions
//! - One traversal per call, at most two launch attempts (rule, fallback)
//! - Every rejected candidate is recorded with its reason; `Failed`
//!   carries the whole list so the report says what was tried
//! - An empty URL (bare double-click) skips the rules entirely

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::env::expand_env;
use crate::config::schema::Config;
use crate::guard::{RecursionKind, SelfIdentityGuard};
use crate::launch::{CommandLine, LaunchError, Launcher};
use crate::routing::matcher::{format_captures, RuleMatcher};
use crate::routing::placeholders::{expand_placeholders, fallback_template};
use crate::shell::Notifier;

/// Which configured program a launch attempt used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateKind {
    Rule { index: usize },
    Fallback,
}

impl fmt::Display for CandidateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandidateKind::Rule { index } => write!(f, "rule #{index}"),
            CandidateKind::Fallback => write!(f, "fallback browser"),
        }
    }
}

/// Why a single candidate was not launched.
#[derive(Debug, Error)]
pub enum CandidateError {
    #[error("program path is empty")]
    EmptyProgram,

    #[error("no fallback browser configured")]
    NotConfigured,

    #[error("recursion prevented: {0}")]
    Recursion(RecursionKind),

    #[error(transparent)]
    Launch(#[from] LaunchError),
}

/// A candidate that was tried and rejected.
#[derive(Debug)]
pub struct FailedAttempt {
    pub candidate: CandidateKind,
    /// Program path as configured (before expansion).
    pub program: String,
    pub error: CandidateError,
}

/// No candidate could be launched.
#[derive(Debug)]
pub struct DispatchFailure {
    pub url: String,
    pub attempts: Vec<FailedAttempt>,
}

impl fmt::Display for DispatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.url.is_empty() {
            write!(f, "No program could be launched (no URL given)")?;
        } else {
            write!(f, "No program could be launched for {}", self.url)?;
        }
        for attempt in &self.attempts {
            write!(f, "\n- {}", attempt.candidate)?;
            if !attempt.program.is_empty() {
                write!(f, " ({})", attempt.program)?;
            }
            write!(f, ": {}", attempt.error)?;
        }
        Ok(())
    }
}

impl std::error::Error for DispatchFailure {}

/// A successful launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launched {
    pub candidate: CandidateKind,
    pub command: CommandLine,
}

/// Routes URLs to programs.
pub struct Dispatcher<'a> {
    config: &'a Config,
    matcher: RuleMatcher,
    guard: &'a SelfIdentityGuard,
    launcher: &'a dyn Launcher,
    notifier: &'a dyn Notifier,
    protocols: Vec<String>,
}

impl<'a> Dispatcher<'a> {
    pub fn new(
        config: &'a Config,
        guard: &'a SelfIdentityGuard,
        launcher: &'a dyn Launcher,
        notifier: &'a dyn Notifier,
    ) -> Self {
        Self {
            config,
            matcher: RuleMatcher::new(),
            guard,
            launcher,
            notifier,
            protocols: config.global.protocols(),
        }
    }

    /// Launch the program for `url`; an empty `url` opens the fallback.
    ///
    /// A failure has already been reported to the notifier when this returns.
    pub fn handle(&self, url: &str) -> Result<Launched, DispatchFailure> {
        let span = tracing::info_span!("dispatch", url = %url);
        let _enter = span.enter();

        let mut attempts = Vec::new();

        if !url.is_empty() {
            let matched = self.matcher.find_match(&self.config.rules, url);
            match (matched.rule, matched.rule_index) {
                (Some(rule), Some(index)) => {
                    tracing::info!(rule = index, regex = %rule.regex, "Rule matched");
                    tracing::debug!(
                        captures = %format_captures(&matched.captures),
                        "Capture groups"
                    );

                    let candidate = CandidateKind::Rule { index };
                    let result = self.attempt(
                        candidate,
                        &rule.program,
                        &rule.arguments,
                        &matched.captures,
                        url,
                    );
                    match result {
                        Ok(launched) => return Ok(launched),
                        Err(error) => {
                            tracing::warn!(
                                rule = index,
                                program = %rule.program,
                                %error,
                                "Rule candidate failed, trying fallback"
                            );
                            attempts.push(FailedAttempt {
                                candidate,
                                program: rule.program.clone(),
                                error,
                            });
                        }
                    }
                }
                _ => tracing::info!("No rule matched"),
            }
        }

        let global = &self.config.global;
        if global.fallback_browser_path.trim().is_empty() {
            attempts.push(FailedAttempt {
                candidate: CandidateKind::Fallback,
                program: String::new(),
                error: CandidateError::NotConfigured,
            });
            return Err(self.fail(url, attempts));
        }

        let template = fallback_template(&global.fallback_browser_args);
        let result = self.attempt(
            CandidateKind::Fallback,
            &global.fallback_browser_path,
            &template,
            &[],
            url,
        );
        match result {
            Ok(launched) => Ok(launched),
            Err(error) => {
                attempts.push(FailedAttempt {
                    candidate: CandidateKind::Fallback,
                    program: global.fallback_browser_path.clone(),
                    error,
                });
                Err(self.fail(url, attempts))
            }
        }
    }

    /// Expanding → GuardChecking → Launching for one candidate.
    fn attempt(
        &self,
        candidate: CandidateKind,
        program: &str,
        arguments: &str,
        captures: &[String],
        url: &str,
    ) -> Result<Launched, CandidateError> {
        let program = expand_env(program.trim());
        if program.trim().is_empty() {
            return Err(CandidateError::EmptyProgram);
        }
        let program = PathBuf::from(program);
        let arguments = expand_placeholders(arguments, captures, url);

        self.guard
            .check(&program, &arguments, &self.protocols)
            .map_err(CandidateError::Recursion)?;

        let command = CommandLine::new(program, arguments);
        self.launcher.launch(&command)?;
        self.notifier
            .log_event(&format!("{candidate} launched: {command}"));

        Ok(Launched { candidate, command })
    }

    fn fail(&self, url: &str, attempts: Vec<FailedAttempt>) -> DispatchFailure {
        let failure = DispatchFailure {
            url: url.to_string(),
            attempts,
        };
        self.notifier.report_error(&failure.to_string());
        failure
    }
}
