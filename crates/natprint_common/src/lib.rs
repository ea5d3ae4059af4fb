//! Shared foundational types used across the natprint workspace.
//!
//! This crate provides the content hash used for every fingerprint source, the
//! length-prefixed combiner that folds ordered records into one hash, POSIX
//! path normalization relative to a project root, and line-ending handling.

#![warn(missing_docs)]

pub mod hash;
pub mod path;
pub mod text;

pub use hash::{ContentHash, ContentHasher, ParseHashError};
pub use path::{normalize_relative, path_to_posix, to_posix, PathError};
pub use text::{is_probably_text, normalize_line_endings};
