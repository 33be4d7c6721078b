//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming URL (or none)
//!     → matcher.rs (first rule whose regex matches, plus capture groups)
//!     → placeholders.rs ($N and {URL} in the argument template)
//!     → dispatcher.rs (guard, launch, fall back, report)
//! ```
//!
//! # Design Decisions
//! - Rules are evaluated in file order; first match wins
//! - Deterministic: same config and URL always pick the same candidate
//! - Explicit no-match rather than silent default

pub mod dispatcher;
pub mod matcher;
pub mod placeholders;

pub use dispatcher::{CandidateError, CandidateKind, DispatchFailure, Dispatcher, Launched};
pub use matcher::{MatchResult, RuleMatcher};
pub use placeholders::{expand_placeholders, fallback_template};
