//! OS shell collaborators.
//!
//! # Data Flow
//! ```text
//! Dispatcher / CLI
//!     → notifier.rs (errors the user has to see)
//!     → registrar.rs (register as the handler for supported schemes)
//! ```
//!
//! # Design Decisions
//! - Capabilities are traits injected at construction; the dispatch core
//!   never calls OS APIs directly
//! - Quiet mode is a constructor argument, not process-wide state

pub mod notifier;
pub mod registrar;

#[cfg(windows)]
pub use notifier::DialogNotifier;
pub use notifier::{ConsoleNotifier, Notifier};
#[cfg(windows)]
pub use registrar::RegistryRegistrar;
pub use registrar::{RegFileRegistrar, RegistrationError, RegistrationPlan, ShellRegistrar};
