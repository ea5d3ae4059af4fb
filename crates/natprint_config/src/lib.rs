//! Options for native project fingerprinting.
//!
//! This crate reads the optional `natprint.toml` file and `.fingerprintignore`,
//! layers command-line overrides on top, and produces validated [`Options`].
//! It also compiles ignore patterns into [`IgnoreRules`].

#![warn(missing_docs)]

pub mod error;
pub mod ignore;
pub mod loader;
pub mod resolve;
pub mod types;

pub use crate::ignore::{parse_ignore_file, IgnoreRules, IGNORE_FILE};
pub use error::ConfigError;
pub use loader::{load_config, load_config_file, load_config_from_str, load_ignore_file, CONFIG_FILE};
pub use resolve::{load_options, resolve_options, OptionOverrides};
pub use types::*;
