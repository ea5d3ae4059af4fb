//! Classification of changes between two fingerprints.
//!
//! Sources are matched by logical identity `(kind, locator_or_id)` with a
//! single linear merge over the two canonically ordered source lists.

use crate::fingerprint::Fingerprint;
use crate::source::{HashSource, SourceKey};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// The classification of a [`DiffEntry`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiffOp {
    /// Present only after.
    Added,
    /// Present only before.
    Removed,
    /// Present on both sides with different hashes.
    Changed,
}

impl DiffOp {
    /// Returns the lowercase name used in JSON output.
    pub fn as_str(self) -> &'static str {
        match self {
            DiffOp::Added => "added",
            DiffOp::Removed => "removed",
            DiffOp::Changed => "changed",
        }
    }
}

impl fmt::Display for DiffOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reported change between two fingerprints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum DiffEntry {
    /// A source that only exists in the newer fingerprint.
    Added {
        /// The new source.
        #[serde(rename = "addedSource")]
        added_source: HashSource,
    },
    /// A source that only exists in the older fingerprint.
    Removed {
        /// The vanished source.
        #[serde(rename = "removedSource")]
        removed_source: HashSource,
    },
    /// A source whose hash differs between the two fingerprints.
    Changed {
        /// The source as it was.
        #[serde(rename = "beforeSource")]
        before_source: HashSource,
        /// The source as it is now.
        #[serde(rename = "afterSource")]
        after_source: HashSource,
    },
}

impl DiffEntry {
    /// Returns the classification.
    pub fn op(&self) -> DiffOp {
        match self {
            DiffEntry::Added { .. } => DiffOp::Added,
            DiffEntry::Removed { .. } => DiffOp::Removed,
            DiffEntry::Changed { .. } => DiffOp::Changed,
        }
    }

    /// Returns the source on the "before" side, if any.
    pub fn before(&self) -> Option<&HashSource> {
        match self {
            DiffEntry::Removed { removed_source } => Some(removed_source),
            DiffEntry::Changed { before_source, .. } => Some(before_source),
            DiffEntry::Added { .. } => None,
        }
    }

    /// Returns the source on the "after" side, if any.
    pub fn after(&self) -> Option<&HashSource> {
        match self {
            DiffEntry::Added { added_source } => Some(added_source),
            DiffEntry::Changed { after_source, .. } => Some(after_source),
            DiffEntry::Removed { .. } => None,
        }
    }

    /// Returns the logical identity the entry concerns.
    pub fn key(&self) -> SourceKey {
        match self {
            DiffEntry::Added { added_source: s }
            | DiffEntry::Removed { removed_source: s }
            | DiffEntry::Changed { after_source: s, .. } => s.key(),
        }
    }
}

/// Diffs two fingerprints.
///
/// Reasons and other metadata are provenance, not content: a source whose
/// hash is unchanged yields no entry even if its reasons differ.
pub fn diff(before: &Fingerprint, after: &Fingerprint) -> Vec<DiffEntry> {
    diff_sources(before.sources(), after.sources())
}

/// Diffs two source lists that are each unique and in canonical order.
///
/// Entries come out in canonical order of their keys.
pub fn diff_sources(before: &[HashSource], after: &[HashSource]) -> Vec<DiffEntry> {
    let mut entries = Vec::new();
    let mut before_iter = before.iter().peekable();
    let mut after_iter = after.iter().peekable();

    loop {
        let ordering = match (before_iter.peek(), after_iter.peek()) {
            (None, None) => break,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some(b), Some(a)) => b.canonical_cmp(a),
        };
        match ordering {
            Ordering::Less => {
                if let Some(b) = before_iter.next() {
                    entries.push(DiffEntry::Removed {
                        removed_source: b.clone(),
                    });
                }
            }
            Ordering::Greater => {
                if let Some(a) = after_iter.next() {
                    entries.push(DiffEntry::Added {
                        added_source: a.clone(),
                    });
                }
            }
            Ordering::Equal => {
                if let (Some(b), Some(a)) = (before_iter.next(), after_iter.next()) {
                    if b.hash != a.hash {
                        entries.push(DiffEntry::Changed {
                            before_source: b.clone(),
                            after_source: a.clone(),
                        });
                    }
                }
            }
        }
    }

    entries
}
