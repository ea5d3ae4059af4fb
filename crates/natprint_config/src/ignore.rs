//! Compiled ignore patterns for excluding paths from hashing.

use crate::error::ConfigError;
use ::ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::Path;

/// Name of the per-project ignore file read next to `natprint.toml`.
pub const IGNORE_FILE: &str = ".fingerprintignore";

/// A compiled set of gitignore-style patterns.
///
/// Paths are matched in project-relative POSIX form. A path is ignored if it
/// or any of its parent directories matches; `!pattern` re-includes.
pub struct IgnoreRules {
    matcher: Gitignore,
}

impl IgnoreRules {
    /// Compiles `patterns` relative to `root`.
    pub fn new<S: AsRef<str>>(root: &Path, patterns: &[S]) -> Result<Self, ConfigError> {
        let mut builder = GitignoreBuilder::new(root);
        for pattern in patterns {
            let pattern = pattern.as_ref();
            builder
                .add_line(None, pattern)
                .map_err(|e| ConfigError::InvalidPattern {
                    pattern: pattern.to_string(),
                    reason: e.to_string(),
                })?;
        }
        let matcher = builder.build().map_err(|e| ConfigError::InvalidPattern {
            pattern: patterns
                .iter()
                .map(|p| p.as_ref())
                .collect::<Vec<_>>()
                .join(", "),
            reason: e.to_string(),
        })?;
        Ok(Self { matcher })
    }

    /// Rules that ignore nothing.
    pub fn empty() -> Self {
        Self {
            matcher: Gitignore::empty(),
        }
    }

    /// Returns `true` if the project-relative `path` is excluded.
    pub fn is_ignored(&self, path: &str, is_dir: bool) -> bool {
        if path.is_empty() || path == "." {
            return false;
        }
        self.matcher
            .matched_path_or_any_parents(Path::new(path), is_dir)
            .is_ignore()
    }
}

/// Parses the contents of an ignore file: one pattern per line, `#` comments.
pub fn parse_ignore_file(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
