//! Error types for discovery, hashing, and fingerprint persistence.

use natprint_config::ConfigError;
use std::path::PathBuf;

/// A collaborator failed to discover its sources.
///
/// Recoverable by default: the builder turns it into a zero-source
/// contribution plus a `D001` diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("collaborator '{collaborator}' failed: {message}")]
pub struct DiscoveryError {
    /// Name of the failing collaborator.
    pub collaborator: String,
    /// Description of the failure.
    pub message: String,
}

impl DiscoveryError {
    /// Creates a discovery error for `collaborator`.
    pub fn new(collaborator: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            collaborator: collaborator.into(),
            message: message.into(),
        }
    }
}

/// A declared source could not be hashed.
#[derive(Debug, thiserror::Error)]
#[error("cannot hash '{locator}' at {}: {source}", .path.display())]
pub struct HashFailure {
    /// Locator of the source that failed.
    pub locator: String,
    /// The filesystem path that could not be read.
    pub path: PathBuf,
    /// The underlying I/O error.
    pub source: std::io::Error,
}

/// Outcome of hashing one source when it does not produce a hash.
#[derive(Debug, thiserror::Error)]
pub enum HashError {
    /// The source could not be read.
    #[error(transparent)]
    Failure(#[from] HashFailure),
    /// The build was cancelled before the source was fully hashed.
    #[error("hashing cancelled")]
    Cancelled,
}

/// Errors returned by fingerprint builds, diffs, and persistence.
///
/// A build either yields a complete [`Fingerprint`](crate::Fingerprint) or one
/// of these; partial fingerprints are never produced.
#[derive(Debug, thiserror::Error)]
pub enum FingerprintError {
    /// A source was rejected during normalization.
    #[error("invalid source '{locator}': {reason}")]
    InvalidSource {
        /// The offending locator or contents id.
        locator: String,
        /// Why the source was rejected.
        reason: String,
    },

    /// A collaborator failed while discovery errors are configured fatal.
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// One or more declared, non-optional sources could not be hashed.
    #[error("failed to hash {} source(s): {}", .failures.len(), summarize(.failures))]
    BuildFailed {
        /// Every hashing failure observed during the build.
        failures: Vec<HashFailure>,
    },

    /// The build was cancelled.
    #[error("fingerprint build cancelled")]
    Cancelled,

    /// Options were invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The bounded worker pool could not be created.
    #[error("failed to start worker pool: {reason}")]
    WorkerPool {
        /// Description of the failure.
        reason: String,
    },

    /// An I/O error occurred while reading or writing a fingerprint file.
    #[error("fingerprint I/O error at {}: {source}", .path.display())]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A fingerprint could not be serialized or deserialized.
    #[error("fingerprint serialization error: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },
}

fn summarize(failures: &[HashFailure]) -> String {
    failures
        .iter()
        .map(|f| f.locator.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
