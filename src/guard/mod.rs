//! Recursion guard subsystem.
//!
//! # Data Flow
//! ```text
//! Resolved candidate (program path, expanded arguments)
//!     → is_self: same path? same content? same product name?
//!     → shell_loop.rs: explorer.exe + a scheme we are registered for?
//!     → Ok, or Err(RecursionKind) and the candidate is rejected
//! ```
//!
//! # Design Decisions
//! - The three identity checks form one predicate; any hit means "self"
//! - Cheapest check first: paths, then size + digest, then the product marker
//! - A target that cannot be read is not "self"; launching it will fail on its own

pub mod identity;
pub mod shell_loop;

use std::fmt;
use std::fs;
use std::path::Path;

pub use identity::{ExecutableIdentity, PRODUCT_NAME};

use identity::{file_digest, read_product_identity};

/// Why a candidate was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecursionKind {
    /// The target program is this router (same file, copy or rename).
    SelfTarget,
    /// The target is the OS shell and the arguments carry a URL we handle.
    ShellLoop { scheme: String },
}

impl fmt::Display for RecursionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecursionKind::SelfTarget => write!(f, "target program is {PRODUCT_NAME} itself"),
            RecursionKind::ShellLoop { scheme } => write!(
                f,
                "{scheme}: link would be handed to {} and back to {PRODUCT_NAME}",
                shell_loop::SHELL_EXECUTABLE
            ),
        }
    }
}

/// Refuses candidates that would start this router again.
#[derive(Debug)]
pub struct SelfIdentityGuard {
    identity: ExecutableIdentity,
}

impl SelfIdentityGuard {
    pub fn new(identity: ExecutableIdentity) -> Self {
        Self { identity }
    }

    pub fn identity(&self) -> &ExecutableIdentity {
        &self.identity
    }

    /// Run both checks for a resolved candidate.
    pub fn check(
        &self,
        program: &Path,
        arguments: &str,
        protocols: &[String],
    ) -> Result<(), RecursionKind> {
        if self.is_self(program) {
            return Err(RecursionKind::SelfTarget);
        }
        if shell_loop::is_shell(program) {
            if let Some(scheme) = shell_loop::find_scheme_reference(arguments, protocols) {
                return Err(RecursionKind::ShellLoop { scheme });
            }
        }
        Ok(())
    }

    /// True when `program` is this router's executable under any name.
    pub fn is_self(&self, program: &Path) -> bool {
        if normalized_path(program) == normalized_path(self.identity.path()) {
            return true;
        }

        let Ok(meta) = fs::metadata(program) else {
            return false;
        };
        if !meta.is_file() {
            return false;
        }

        if self.same_content(program, meta.len()) {
            tracing::debug!(
                program = %program.display(),
                "Target has the same content as this executable"
            );
            return true;
        }

        match read_product_identity(program) {
            Some(product) if product == self.identity.product_identity() => {
                tracing::debug!(
                    program = %program.display(),
                    %product,
                    "Target carries our product name"
                );
                true
            }
            _ => false,
        }
    }

    pub fn would_recurse_through_shell(
        &self,
        program: &Path,
        arguments: &str,
        protocols: &[String],
    ) -> bool {
        shell_loop::would_recurse_through_shell(program, arguments, protocols)
    }

    fn same_content(&self, program: &Path, program_len: u64) -> bool {
        let own_len = fs::metadata(self.identity.path()).map(|m| m.len()).ok();
        if own_len != Some(program_len) {
            return false;
        }
        match (self.identity.content_digest(), file_digest(program)) {
            (Some(own), Ok(other)) => own == other,
            _ => false,
        }
    }
}

/// Absolute, symlink-resolved where possible, compared case-insensitively
/// with `\` separators and without the verbatim `\\?\` prefix.
fn normalized_path(path: &Path) -> String {
    let resolved = path
        .canonicalize()
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf());
    let text = resolved.to_string_lossy().replace('/', "\\").to_lowercase();
    match text.strip_prefix(r"\\?\") {
        Some(stripped) => stripped.to_string(),
        None => text,
    }
}
