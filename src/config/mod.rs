//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (JSON)
//!     → loader.rs (locate, read & deserialize, or write defaults)
//!         browser.rs picks the fallback browser for fresh defaults
//!     → validation.rs (semantic checks, reported as warnings)
//!     → Config (immutable for the rest of the process)
//!
//! Paths inside the config:
//!     env.rs expands %NAME% / ${NAME} before any path is used
//! ```
//!
//! # Design Decisions
//! - Config is read once per process; dispatch never writes it
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod browser;
pub mod env;
pub mod loader;
pub mod schema;
pub mod validation;

pub use env::expand_env;
pub use loader::{
    load_config, load_config_with_origin, resolve_config_path, save_config, ConfigError,
    ConfigOrigin,
};
pub use schema::Config;
pub use schema::GlobalSettings;
pub use schema::Rule;
pub use validation::{validate_config, ValidationIssue};
