//! Canonicalization and deduplication of raw discovery results.
//!
//! The normalizer rewrites file and directory locators to project-relative
//! POSIX form, merges duplicates on `(kind, locator_or_id)`, and sorts into the
//! canonical order. Nothing is read from disk here.

use crate::error::FingerprintError;
use crate::source::{HashSource, SourceKey};
use natprint_common::normalize_relative;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::path::Path;

/// Normalizes `raw` sources discovered under `root`.
///
/// Duplicates merge by unioning their reasons; the first-seen target wins and
/// the merged source is optional only if every duplicate was. Two contents
/// sources sharing an id but carrying different payloads are rejected, as are
/// sources without reasons and locators that escape the root. Hashes carried
/// by raw sources are discarded.
pub fn normalize(root: &Path, raw: Vec<HashSource>) -> Result<Vec<HashSource>, FingerprintError> {
    let mut merged: BTreeMap<SourceKey, HashSource> = BTreeMap::new();

    for mut source in raw {
        if source.reasons.is_empty() {
            return Err(invalid(source.locator(), "source has no reasons"));
        }
        match source.payload() {
            Some(_) if source.locator().is_empty() => {
                return Err(invalid("", "contents source has an empty id"));
            }
            Some(_) => {}
            None => {
                let relative = normalize_relative(root, source.locator())
                    .map_err(|e| invalid(source.locator(), &e.to_string()))?;
                source.set_locator(relative);
            }
        }
        source.hash = None;
        source.debug_info = None;

        match merged.entry(source.key()) {
            Entry::Vacant(slot) => {
                slot.insert(source);
            }
            Entry::Occupied(mut slot) => {
                let existing = slot.get_mut();
                if existing.payload() != source.payload() {
                    return Err(invalid(
                        source.locator(),
                        "declared twice with different contents",
                    ));
                }
                existing.reasons.extend(source.reasons);
                existing.optional &= source.optional;
            }
        }
    }

    Ok(merged.into_values().collect())
}

fn invalid(locator: &str, reason: &str) -> FingerprintError {
    FingerprintError::InvalidSource {
        locator: locator.to_string(),
        reason: reason.to_string(),
    }
}
