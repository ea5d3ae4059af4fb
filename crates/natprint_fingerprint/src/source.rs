//! The unit of fingerprint input: a file, a directory subtree, or literal contents.

use natprint_common::ContentHash;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

/// The kind of a [`HashSource`].
///
/// Declaration order is the canonical order: `file < dir < contents`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// A single file read from disk.
    File,
    /// A directory subtree read from disk.
    Dir,
    /// Literal contents supplied by a collaborator.
    Contents,
}

impl SourceKind {
    /// Returns the lowercase tag used in JSON and in the aggregate hash.
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::File => "file",
            SourceKind::Dir => "dir",
            SourceKind::Contents => "contents",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a [`HashSource`] points at.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceTarget {
    /// A file at a project-relative path.
    File {
        /// Project-relative POSIX path once normalized.
        #[serde(rename = "filePath")]
        file_path: String,
    },
    /// A directory at a project-relative path.
    Dir {
        /// Project-relative POSIX path once normalized.
        #[serde(rename = "filePath")]
        file_path: String,
    },
    /// Literal contents identified by an id unique among contents sources.
    Contents {
        /// Opaque identifier chosen by the producing collaborator.
        id: String,
        /// The text that is hashed.
        contents: String,
    },
}

/// Hash of one file inside a directory source, recorded in debug mode.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDebugInfo {
    /// Path relative to the directory source, POSIX form.
    pub path: String,
    /// Content hash of the file.
    pub hash: ContentHash,
}

/// One unit of input to the fingerprint.
///
/// Only the target (kind, locator, and contents payload) and the bytes on disk
/// determine [`hash`](Self::hash); `reasons`, `optional` and `debug_info` are
/// metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashSource {
    /// What is hashed.
    #[serde(flatten)]
    pub target: SourceTarget,
    /// Provenance labels naming the collaborators that contributed this source.
    pub reasons: BTreeSet<String>,
    /// Content hash, present once the source has been hashed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<ContentHash>,
    /// A hashing failure drops the source instead of failing the build.
    #[serde(default, skip_serializing_if = "is_false")]
    pub optional: bool,
    /// Per-file hashes of a directory source, when debug mode is on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_info: Option<Vec<FileDebugInfo>>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl HashSource {
    fn with_target(target: SourceTarget, reason: impl Into<String>) -> Self {
        Self {
            target,
            reasons: BTreeSet::from([reason.into()]),
            hash: None,
            optional: false,
            debug_info: None,
        }
    }

    /// Creates a file source.
    pub fn file(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::with_target(
            SourceTarget::File {
                file_path: path.into(),
            },
            reason,
        )
    }

    /// Creates a directory source.
    pub fn dir(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::with_target(
            SourceTarget::Dir {
                file_path: path.into(),
            },
            reason,
        )
    }

    /// Creates a contents source.
    pub fn contents(
        id: impl Into<String>,
        contents: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::with_target(
            SourceTarget::Contents {
                id: id.into(),
                contents: contents.into(),
            },
            reason,
        )
    }

    /// Adds a provenance label.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reasons.insert(reason.into());
        self
    }

    /// Marks the source optional.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Returns the source kind.
    pub fn kind(&self) -> SourceKind {
        match self.target {
            SourceTarget::File { .. } => SourceKind::File,
            SourceTarget::Dir { .. } => SourceKind::Dir,
            SourceTarget::Contents { .. } => SourceKind::Contents,
        }
    }

    /// Returns the path for file/dir sources or the id for contents sources.
    pub fn locator(&self) -> &str {
        match &self.target {
            SourceTarget::File { file_path } | SourceTarget::Dir { file_path } => file_path,
            SourceTarget::Contents { id, .. } => id,
        }
    }

    /// Returns the contents payload, for contents sources.
    pub fn payload(&self) -> Option<&str> {
        match &self.target {
            SourceTarget::Contents { contents, .. } => Some(contents),
            _ => None,
        }
    }

    /// Returns the logical identity of this source.
    pub fn key(&self) -> SourceKey {
        SourceKey::new(self.kind(), self.locator())
    }

    /// Compares two sources by canonical order without allocating keys.
    pub fn canonical_cmp(&self, other: &HashSource) -> Ordering {
        self.kind()
            .cmp(&other.kind())
            .then_with(|| self.locator().cmp(other.locator()))
    }

    pub(crate) fn set_locator(&mut self, locator: String) {
        match &mut self.target {
            SourceTarget::File { file_path } | SourceTarget::Dir { file_path } => {
                *file_path = locator
            }
            SourceTarget::Contents { id, .. } => *id = locator,
        }
    }
}

/// The logical identity of a source: `(kind, locator_or_id)`.
///
/// The derived ordering is the canonical order: kind first, then byte-wise
/// locator comparison.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceKey {
    /// The source kind.
    pub kind: SourceKind,
    /// Path or contents id.
    pub locator: String,
}

impl SourceKey {
    /// Creates a key.
    pub fn new(kind: SourceKind, locator: impl Into<String>) -> Self {
        Self {
            kind,
            locator: locator.into(),
        }
    }
}

impl fmt::Display for SourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.locator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_order_is_file_dir_contents() {
        assert!(SourceKind::File < SourceKind::Dir);
        assert!(SourceKind::Dir < SourceKind::Contents);
    }

    #[test]
    fn key_order_kind_then_locator() {
        let mut keys = vec![
            SourceKey::new(SourceKind::Contents, "a"),
            SourceKey::new(SourceKind::Dir, "ios"),
            SourceKey::new(SourceKind::File, "z"),
            SourceKey::new(SourceKind::Dir, "android"),
        ];
        keys.sort();
        let shown: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        assert_eq!(shown, vec!["file:z", "dir:android", "dir:ios", "contents:a"]);
    }

    #[test]
    fn locator_compare_is_bytewise() {
        let upper = HashSource::file("Z", "r");
        let lower = HashSource::file("a", "r");
        assert_eq!(upper.canonical_cmp(&lower), Ordering::Less);
    }

    #[test]
    fn accessors() {
        let s = HashSource::contents("packageJson:scripts", "{}", "packageJsonScripts");
        assert_eq!(s.kind(), SourceKind::Contents);
        assert_eq!(s.locator(), "packageJson:scripts");
        assert_eq!(s.payload(), Some("{}"));
        assert!(HashSource::dir("android", "r").payload().is_none());
    }

    #[test]
    fn dir_json_shape() {
        let source = HashSource::dir("android", "bareNativeDir");
        let json = serde_json::to_string(&source).unwrap();
        assert_eq!(
            json,
            r#"{"type":"dir","filePath":"android","reasons":["bareNativeDir"]}"#
        );
    }

    #[test]
    fn contents_json_shape_with_hash() {
        let mut source = HashSource::contents("id", "x", "r").optional();
        source.hash = Some(ContentHash::EMPTY_DIR);
        let value = serde_json::to_value(&source).unwrap();
        assert_eq!(value["type"], "contents");
        assert_eq!(value["id"], "id");
        assert_eq!(value["contents"], "x");
        assert_eq!(value["hash"], "00000000000000000000000000000000");
        assert_eq!(value["optional"], true);
        assert!(value.get("debugInfo").is_none());
    }

    #[test]
    fn json_roundtrip_preserves_metadata() {
        let mut source = HashSource::dir("ios", "bareNativeDir").with_reason("extraSources");
        source.hash = Some(ContentHash::from_bytes(b"x"));
        source.debug_info = Some(vec![FileDebugInfo {
            path: "Podfile".to_string(),
            hash: ContentHash::from_bytes(b"pod"),
        }]);
        let json = serde_json::to_string(&source).unwrap();
        assert!(json.contains("\"debugInfo\""));
        let back: HashSource = serde_json::from_str(&json).unwrap();
        assert_eq!(back, source);
    }
}
