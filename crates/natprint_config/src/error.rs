//! Error types for configuration loading and validation.

/// Errors that can occur when loading or validating fingerprint options.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading a configuration file.
    #[error("failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// A source-skip flag name is not part of the recognized set.
    #[error("unknown source skip flag '{0}'")]
    UnknownFlag(String),

    /// A platform name is not recognized.
    #[error("unknown platform '{0}'")]
    UnknownPlatform(String),

    /// An ignore pattern could not be compiled.
    #[error("invalid ignore pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Why the pattern was rejected.
        reason: String,
    },

    /// A configuration value failed validation.
    #[error("validation error: {0}")]
    ValidationError(String),
}
