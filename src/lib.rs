//! Rule-driven link router library

pub mod config;
pub mod guard;
pub mod launch;
pub mod observability;
pub mod routing;
pub mod shell;

pub use config::schema::Config;
pub use routing::Dispatcher;

/// True when a command-line argument is worth dispatching as a URL.
///
/// Anything shorter (after trimming) is treated as a bare invocation.
pub fn is_dispatchable_url(arg: &str) -> bool {
    arg.trim().chars().count() > 1
}
