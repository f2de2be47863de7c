//! Parsing and validation of `ember.toml` engine configuration.
//!
//! Configuration is read once, before an engine is created, and frozen into
//! the engine for its whole lifetime.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, validate_config, CONFIG_FILE_NAME};
pub use types::*;
