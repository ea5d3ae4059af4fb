//! The immutable result of a fingerprint build and its JSON persistence.

use crate::diff::{diff, DiffEntry};
use crate::error::FingerprintError;
use crate::hasher::aggregate_hash;
use crate::source::{HashSource, SourceKey};
use natprint_common::ContentHash;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::Path;

/// Hashed sources in canonical order plus their aggregate hash.
///
/// The aggregate is a pure function of the `(kind, locator_or_id, hash)`
/// triples; reasons and other metadata never contribute.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawFingerprint")]
pub struct Fingerprint {
    sources: Vec<HashSource>,
    hash: ContentHash,
}

#[derive(Deserialize)]
struct RawFingerprint {
    sources: Vec<HashSource>,
    hash: ContentHash,
}

impl TryFrom<RawFingerprint> for Fingerprint {
    type Error = FingerprintError;

    fn try_from(raw: RawFingerprint) -> Result<Self, Self::Error> {
        let fingerprint = Fingerprint::from_sources(raw.sources)?;
        if fingerprint.hash != raw.hash {
            return Err(FingerprintError::Serialization {
                reason: format!(
                    "stored hash {} does not match sources (expected {})",
                    raw.hash, fingerprint.hash
                ),
            });
        }
        Ok(fingerprint)
    }
}

impl Fingerprint {
    /// Assembles a fingerprint from hashed sources already in canonical order.
    ///
    /// Fails if a source is unhashed, out of order, or duplicated.
    pub fn from_sources(sources: Vec<HashSource>) -> Result<Self, FingerprintError> {
        for pair in sources.windows(2) {
            if pair[0].canonical_cmp(&pair[1]) != Ordering::Less {
                return Err(FingerprintError::InvalidSource {
                    locator: pair[1].key().to_string(),
                    reason: "sources are not unique and in canonical order".to_string(),
                });
            }
        }
        let mut triples = Vec::with_capacity(sources.len());
        for source in &sources {
            let hash = source
                .hash
                .as_ref()
                .ok_or_else(|| FingerprintError::InvalidSource {
                    locator: source.key().to_string(),
                    reason: "source has not been hashed".to_string(),
                })?;
            triples.push((source.kind(), source.locator(), hash));
        }
        let hash = aggregate_hash(triples);
        Ok(Self { sources, hash })
    }

    /// The aggregate hash.
    pub fn hash(&self) -> ContentHash {
        self.hash
    }

    /// The hashed sources in canonical order.
    pub fn sources(&self) -> &[HashSource] {
        &self.sources
    }

    /// Consumes the fingerprint, returning its sources.
    pub fn into_sources(self) -> Vec<HashSource> {
        self.sources
    }

    /// Number of sources.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Returns `true` if the fingerprint has no sources.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Looks up a source by logical identity.
    pub fn source(&self, key: &SourceKey) -> Option<&HashSource> {
        self.sources
            .binary_search_by(|s| {
                s.kind()
                    .cmp(&key.kind)
                    .then_with(|| s.locator().cmp(key.locator.as_str()))
            })
            .ok()
            .map(|i| &self.sources[i])
    }

    /// Diffs this fingerprint (as "before") against `after`.
    pub fn diff(&self, after: &Fingerprint) -> Vec<DiffEntry> {
        diff(self, after)
    }

    /// Serializes to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, FingerprintError> {
        serde_json::to_string_pretty(self).map_err(|e| FingerprintError::Serialization {
            reason: e.to_string(),
        })
    }

    /// Parses and validates a fingerprint from JSON.
    pub fn from_json(json: &str) -> Result<Self, FingerprintError> {
        serde_json::from_str(json).map_err(|e| FingerprintError::Serialization {
            reason: e.to_string(),
        })
    }

    /// Writes the fingerprint as JSON to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), FingerprintError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| FingerprintError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|e| FingerprintError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Reads and validates a fingerprint JSON file.
    pub fn load(path: &Path) -> Result<Self, FingerprintError> {
        let content = std::fs::read_to_string(path).map_err(|e| FingerprintError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&content)
    }
}
