//! Bare native project directories and the project `.gitignore`.

use crate::file_based_source;
use natprint_config::{Options, Platform, SourceSkip};
use natprint_fingerprint::{Collaborator, DiscoveryError, HashSource};
use std::path::Path;
use tracing::debug;

/// Contributes the `android/` or `ios/` directory when it exists.
pub struct BareNativeDir {
    platform: Platform,
}

impl BareNativeDir {
    /// The `android/` directory, gated on [`Platform::Android`].
    pub fn android() -> Self {
        Self {
            platform: Platform::Android,
        }
    }

    /// The `ios/` directory, gated on [`Platform::Ios`].
    pub fn ios() -> Self {
        Self {
            platform: Platform::Ios,
        }
    }
}

impl Collaborator for BareNativeDir {
    fn name(&self) -> &str {
        match self.platform {
            Platform::Android => "bareAndroidDir",
            Platform::Ios => "bareIosDir",
        }
    }

    fn platforms(&self) -> Option<&[Platform]> {
        Some(std::slice::from_ref(&self.platform))
    }

    fn discover(
        &self,
        project_root: &Path,
        _options: &Options,
    ) -> Result<Vec<HashSource>, DiscoveryError> {
        let dir = self.platform.as_str();
        let source = file_based_source(project_root, dir, "bareNativeDir");
        if source.is_some() {
            debug!(dir, "adding bare native dir");
        }
        Ok(source.into_iter().collect())
    }
}

/// Contributes the project `.gitignore`, unless `git-ignore` is skipped.
pub struct GitIgnore;

impl Collaborator for GitIgnore {
    fn name(&self) -> &str {
        "bareGitIgnore"
    }

    fn is_skipped(&self, options: &Options) -> bool {
        options.skips(SourceSkip::GitIgnore)
    }

    fn discover(
        &self,
        project_root: &Path,
        _options: &Options,
    ) -> Result<Vec<HashSource>, DiscoveryError> {
        let source = file_based_source(project_root, ".gitignore", "bareGitIgnore");
        if source.is_some() {
            debug!("adding file .gitignore");
        }
        Ok(source.into_iter().collect())
    }
}
