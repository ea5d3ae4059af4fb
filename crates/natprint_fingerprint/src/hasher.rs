//! Content hashing of sources and the aggregate fingerprint hash.
//!
//! Contents sources hash their payload bytes as given. Files hash their bytes
//! (CRLF folded to LF for text when enabled). A directory hashes the sorted
//! list of `(relative path, file hash)` records of every regular file beneath
//! it, so the result depends on the tree shape and content but not on
//! enumeration order or the host path separator. Symlinks are never followed.

use crate::error::{HashError, HashFailure};
use crate::source::{FileDebugInfo, HashSource, SourceKind, SourceTarget};
use natprint_common::{normalize_line_endings, path_to_posix, ContentHash, ContentHasher};
use natprint_config::{IgnoreRules, Options};
use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};
use walkdir::WalkDir;

/// Hashes normalized sources relative to a project root.
///
/// Per-file hashing inside a directory runs on the current rayon pool, so
/// calling [`hash_source`](Self::hash_source) from within a bounded pool keeps
/// file reads under the same cap.
pub struct SourceHasher<'a> {
    root: &'a Path,
    ignore: &'a IgnoreRules,
    normalize_line_endings: bool,
    debug: bool,
    cancel: &'a CancellationToken,
}

impl<'a> SourceHasher<'a> {
    /// Creates a hasher for `root` using the line-ending and debug settings of `options`.
    pub fn new(
        root: &'a Path,
        ignore: &'a IgnoreRules,
        options: &Options,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            root,
            ignore,
            normalize_line_endings: options.normalize_line_endings,
            debug: options.debug,
            cancel,
        }
    }

    /// Computes and stores the hash of `source`.
    ///
    /// Directory sources also receive per-file `debug_info` in debug mode.
    pub fn hash_source(&self, source: &mut HashSource) -> Result<(), HashError> {
        self.check_cancelled()?;
        let (hash, debug_info) = match &source.target {
            SourceTarget::Contents { contents, .. } => {
                (ContentHash::from_bytes(contents.as_bytes()), None)
            }
            SourceTarget::File { file_path } => (self.hash_file(file_path)?, None),
            SourceTarget::Dir { file_path } => self.hash_dir(file_path)?,
        };
        trace!(source = %source.key(), %hash, "hashed source");
        source.hash = Some(hash);
        source.debug_info = debug_info;
        Ok(())
    }

    /// Hashes file content, folding CRLF to LF for text when enabled.
    fn hash_file_bytes(&self, bytes: &[u8]) -> ContentHash {
        if self.normalize_line_endings {
            ContentHash::from_bytes(&normalize_line_endings(bytes))
        } else {
            ContentHash::from_bytes(bytes)
        }
    }

    fn hash_file(&self, locator: &str) -> Result<ContentHash, HashError> {
        let path = self.root.join(locator);
        let metadata = fs::metadata(&path).map_err(|e| failure(locator, &path, e))?;
        if metadata.is_dir() {
            return Err(failure(
                locator,
                &path,
                io::Error::new(io::ErrorKind::InvalidInput, "expected a file, found a directory"),
            )
            .into());
        }
        self.read_and_hash(locator, &path)
    }

    fn hash_dir(
        &self,
        locator: &str,
    ) -> Result<(ContentHash, Option<Vec<FileDebugInfo>>), HashError> {
        let dir = self.root.join(locator);
        let metadata = fs::metadata(&dir).map_err(|e| failure(locator, &dir, e))?;
        if !metadata.is_dir() {
            return Err(failure(
                locator,
                &dir,
                io::Error::new(io::ErrorKind::InvalidInput, "expected a directory, found a file"),
            )
            .into());
        }

        let files = self.list_files(locator, &dir)?;
        let mut entries = files
            .par_iter()
            .map(|(relative, path)| {
                self.check_cancelled()?;
                let hash = self.read_and_hash(locator, path)?;
                Ok(FileDebugInfo {
                    path: relative.clone(),
                    hash,
                })
            })
            .collect::<Result<Vec<_>, HashError>>()?;
        entries.sort_by(|a, b| a.path.cmp(&b.path));

        debug!(dir = locator, files = entries.len(), "hashed directory");
        let hash = dir_hash(&entries);
        Ok((hash, self.debug.then_some(entries)))
    }

    /// Lists regular files under `dir` as `(dir-relative POSIX path, host path)`.
    ///
    /// Ignored subdirectories are pruned from the walk.
    fn list_files(&self, locator: &str, dir: &Path) -> Result<Vec<(String, PathBuf)>, HashError> {
        let walker = WalkDir::new(dir)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| {
                if entry.depth() == 0 || !entry.file_type().is_dir() {
                    return true;
                }
                let project_path = project_path(locator, &relative_posix(dir, entry.path()));
                let keep = !self.ignore.is_ignored(&project_path, true);
                if !keep {
                    debug!(path = %project_path, "pruned ignored directory");
                }
                keep
            });

        let mut files = Vec::new();
        for entry in walker {
            self.check_cancelled()?;
            let entry = entry.map_err(|e| {
                let path = e.path().map_or_else(|| dir.to_path_buf(), Path::to_path_buf);
                failure(locator, &path, io::Error::from(e))
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = relative_posix(dir, entry.path());
            let project_path = project_path(locator, &relative);
            if self.ignore.is_ignored(&project_path, false) {
                debug!(path = %project_path, "skipped ignored file");
                continue;
            }
            files.push((relative, entry.into_path()));
        }
        Ok(files)
    }

    fn read_and_hash(&self, locator: &str, path: &Path) -> Result<ContentHash, HashError> {
        let bytes = fs::read(path).map_err(|e| failure(locator, path, e))?;
        Ok(self.hash_file_bytes(&bytes))
    }

    fn check_cancelled(&self) -> Result<(), HashError> {
        if self.cancel.is_cancelled() {
            Err(HashError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Folds sorted `(relative path, file hash)` records into a subtree hash.
///
/// An empty list yields [`ContentHash::EMPTY_DIR`].
pub fn dir_hash(entries: &[FileDebugInfo]) -> ContentHash {
    if entries.is_empty() {
        return ContentHash::EMPTY_DIR;
    }
    let mut hasher = ContentHasher::new();
    for entry in entries {
        hasher.str_field(&entry.path).hash_field(&entry.hash);
    }
    hasher.finish()
}

/// Folds `(kind, locator_or_id, hash)` triples, in the order given, into the
/// aggregate fingerprint hash.
pub fn aggregate_hash<'s, I>(entries: I) -> ContentHash
where
    I: IntoIterator<Item = (SourceKind, &'s str, &'s ContentHash)>,
{
    let mut hasher = ContentHasher::new();
    for (kind, locator, hash) in entries {
        hasher
            .str_field(kind.as_str())
            .str_field(locator)
            .hash_field(hash);
    }
    hasher.finish()
}

fn relative_posix(dir: &Path, path: &Path) -> String {
    path_to_posix(path.strip_prefix(dir).unwrap_or(path))
}

fn project_path(locator: &str, relative: &str) -> String {
    if locator == "." {
        relative.to_string()
    } else {
        format!("{locator}/{relative}")
    }
}

fn failure(locator: &str, path: &Path, source: io::Error) -> HashFailure {
    HashFailure {
        locator: locator.to_string(),
        path: path.to_path_buf(),
        source,
    }
}
