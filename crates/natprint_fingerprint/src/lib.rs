//! Deterministic fingerprints of a project's native-relevant surface.
//!
//! Registered [`Collaborator`]s discover [`HashSource`]s, the normalizer
//! canonicalizes and deduplicates them, the [`SourceHasher`] hashes files,
//! directory subtrees, and literal contents, and the [`FingerprintBuilder`]
//! folds everything into a [`Fingerprint`]. Two fingerprints are compared
//! with [`diff`], which classifies each source as added, removed, or changed.

#![warn(missing_docs)]

pub mod builder;
pub mod collaborator;
pub mod diff;
pub mod error;
pub mod fingerprint;
pub mod hasher;
pub mod normalizer;
pub mod source;

pub use builder::{create_project_hash, diff_fingerprint_changes, FingerprintBuilder};
pub use collaborator::{Collaborator, FnCollaborator};
pub use diff::{diff, diff_sources, DiffEntry, DiffOp};
pub use error::{DiscoveryError, FingerprintError, HashError, HashFailure};
pub use fingerprint::Fingerprint;
pub use hasher::{aggregate_hash, dir_hash, SourceHasher};
pub use normalizer::normalize;
pub use source::{FileDebugInfo, HashSource, SourceKey, SourceKind, SourceTarget};
