//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (rule matched, candidate rejected, command line)
//!
//! Consumers:
//!     → logging.rs subscriber (log file from config, or stderr)
//! ```
//!
//! # Design Decisions
//! - Structured fields (rule index, program, error) rather than prose
//! - One `dispatch` span per URL so every line carries the URL

pub mod logging;

pub use logging::{init_logging, resolve_log_target, LogTarget};
