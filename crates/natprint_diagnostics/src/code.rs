//! Diagnostic codes with category prefixes for structured identification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The category of a diagnostic code, determining its prefix letter.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Category {
    /// Collaborator discovery diagnostics, prefixed with `D`.
    Discovery,
    /// Content hashing diagnostics, prefixed with `H`.
    Hashing,
    /// Source normalization and filtering diagnostics, prefixed with `S`.
    Source,
    /// Configuration diagnostics, prefixed with `C`.
    Config,
}

impl Category {
    /// Returns the single-character prefix for this category.
    pub fn prefix(self) -> char {
        match self {
            Category::Discovery => 'D',
            Category::Hashing => 'H',
            Category::Source => 'S',
            Category::Config => 'C',
        }
    }
}

/// A structured diagnostic code combining a category prefix and a numeric identifier.
///
/// Displayed as the category prefix followed by a zero-padded 3-digit number,
/// e.g., `D001`, `H002`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DiagnosticCode {
    /// The category of this diagnostic.
    pub category: Category,
    /// The numeric identifier within the category.
    pub number: u16,
}

impl DiagnosticCode {
    /// A collaborator failed and contributed no sources.
    pub const COLLABORATOR_FAILED: DiagnosticCode = DiagnosticCode::new(Category::Discovery, 1);
    /// A collaborator was skipped by options before running.
    pub const COLLABORATOR_SKIPPED: DiagnosticCode = DiagnosticCode::new(Category::Discovery, 2);
    /// A required source could not be hashed; the build fails.
    pub const SOURCE_UNHASHABLE: DiagnosticCode = DiagnosticCode::new(Category::Hashing, 1);
    /// An optional source could not be hashed and was dropped.
    pub const OPTIONAL_SOURCE_UNHASHABLE: DiagnosticCode = DiagnosticCode::new(Category::Hashing, 2);
    /// A source matched an ignore pattern and was dropped.
    pub const SOURCE_IGNORED: DiagnosticCode = DiagnosticCode::new(Category::Source, 1);
    /// Options could not be loaded or failed validation.
    pub const CONFIG_INVALID: DiagnosticCode = DiagnosticCode::new(Category::Config, 1);

    /// Creates a new diagnostic code.
    pub const fn new(category: Category, number: u16) -> Self {
        Self { category, number }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", self.category.prefix(), self.number)
    }
}
