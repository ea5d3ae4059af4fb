//! How serious a diagnostic is.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Diagnostic severity; variants are declared from mildest to gravest so the
/// derived ordering can be used for filtering.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational, e.g. a collaborator skipped by options or an ignored source.
    Note,
    /// A recovered problem; the fingerprint is still produced.
    Warning,
    /// No fingerprint can be produced.
    Error,
}

impl Severity {
    /// Returns `true` for [`Severity::Error`].
    pub fn is_error(self) -> bool {
        self == Severity::Error
    }

    /// Lowercase label used in rendered output.
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Note => "note",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
