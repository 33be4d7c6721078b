//! Windows command-line construction and parsing.
//!
//! # Responsibilities
//! - Assemble the exact command line a target program receives
//! - Split argument text into argv the way the MSVC runtime does
//!
//! # Design Decisions
//! - This is the only place command-line text is built
//! - The program is always quoted; the argument text is passed verbatim.
//!   Quoting arguments is the rule author's job, as in a shortcut or
//!   registry command
//! - Splitting follows the post-2008 MSVC rules, so hosts without raw
//!   command lines still deliver the argv a Windows target would see

use std::fmt;
use std::path::{Path, PathBuf};

/// A program plus its already-expanded argument text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: PathBuf,
    arguments: String,
}

impl CommandLine {
    pub fn new(program: impl Into<PathBuf>, arguments: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            arguments: arguments.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn arguments(&self) -> &str {
        &self.arguments
    }

    /// Arguments as the target's `argv[1..]`.
    pub fn argv(&self) -> Vec<String> {
        split_arguments(&self.arguments)
    }
}

impl fmt::Display for CommandLine {
    /// `"<program>"`, then a space and the arguments when there are any.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.program.display())?;
        if !self.arguments.is_empty() {
            write!(f, " {}", self.arguments)?;
        }
        Ok(())
    }
}

/// Split argument text into arguments using the MSVC runtime rules.
///
/// - Spaces and tabs separate arguments outside quotes
/// - `2n` backslashes before `"` give `n` backslashes and toggle quoting
/// - `2n+1` backslashes before `"` give `n` backslashes and a literal `"`
/// - Backslashes not followed by `"` are literal
/// - Inside quotes, `""` is a literal `"`
pub fn split_arguments(text: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_arg = false;
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            ' ' | '\t' if !in_quotes => {
                if in_arg {
                    args.push(std::mem::take(&mut current));
                    in_arg = false;
                }
            }
            '\\' => {
                in_arg = true;
                let mut backslashes = 1;
                while chars.peek() == Some(&'\\') {
                    chars.next();
                    backslashes += 1;
                }
                if chars.peek() == Some(&'"') {
                    current.extend(std::iter::repeat('\\').take(backslashes / 2));
                    if backslashes % 2 == 1 {
                        chars.next();
                        current.push('"');
                    }
                } else {
                    current.extend(std::iter::repeat('\\').take(backslashes));
                }
            }
            '"' => {
                in_arg = true;
                if in_quotes && chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = !in_quotes;
                }
            }
            other => {
                in_arg = true;
                current.push(other);
            }
        }
    }

    if in_arg {
        args.push(current);
    }
    args
}
