//! The discovery interface implemented by every source producer.

use crate::error::DiscoveryError;
use crate::source::HashSource;
use natprint_config::{Options, Platform};
use std::path::Path;

/// A pluggable producer of [`HashSource`]s for one category of project content.
///
/// Collaborators run concurrently on the builder's worker pool and must be
/// idempotent and free of side effects on the project. Locators may be
/// project-relative or absolute under the project root.
pub trait Collaborator: Send + Sync {
    /// Name used in logs and diagnostics.
    fn name(&self) -> &str;

    /// Platforms this collaborator is restricted to; `None` runs for any.
    ///
    /// The builder skips the collaborator when none of these platforms is enabled.
    fn platforms(&self) -> Option<&[Platform]> {
        None
    }

    /// Returns `true` if options exclude this collaborator entirely.
    ///
    /// Checked before [`discover`](Self::discover) runs.
    fn is_skipped(&self, _options: &Options) -> bool {
        false
    }

    /// Discovers the sources under `project_root`.
    fn discover(
        &self,
        project_root: &Path,
        options: &Options,
    ) -> Result<Vec<HashSource>, DiscoveryError>;
}

/// A collaborator backed by a closure.
///
/// Useful for embedding one-off discovery logic and for tests.
pub struct FnCollaborator<F> {
    name: String,
    discover: F,
}

impl<F> FnCollaborator<F>
where
    F: Fn(&Path, &Options) -> Result<Vec<HashSource>, DiscoveryError> + Send + Sync,
{
    /// Wraps `discover` under `name`.
    pub fn new(name: impl Into<String>, discover: F) -> Self {
        Self {
            name: name.into(),
            discover,
        }
    }
}

impl<F> Collaborator for FnCollaborator<F>
where
    F: Fn(&Path, &Options) -> Result<Vec<HashSource>, DiscoveryError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn discover(
        &self,
        project_root: &Path,
        options: &Options,
    ) -> Result<Vec<HashSource>, DiscoveryError> {
        (self.discover)(project_root, options)
    }
}

/// Returns `true` if `collaborator` may run under `options`' platform set.
pub fn platform_enabled(collaborator: &dyn Collaborator, options: &Options) -> bool {
    collaborator
        .platforms()
        .map_or(true, |platforms| platforms.iter().any(|p| options.has_platform(*p)))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct IosOnly;

    impl Collaborator for IosOnly {
        fn name(&self) -> &str {
            "iosOnly"
        }

        fn platforms(&self) -> Option<&[Platform]> {
            Some(&[Platform::Ios])
        }

        fn discover(&self, _: &Path, _: &Options) -> Result<Vec<HashSource>, DiscoveryError> {
            Ok(vec![HashSource::dir("ios", "iosOnly")])
        }
    }

    #[test]
    fn fn_collaborator_delegates() {
        let c = FnCollaborator::new("fake", |_root: &Path, _opts: &Options| {
            Ok(vec![HashSource::contents("id", "x", "fake")])
        });
        assert_eq!(c.name(), "fake");
        assert!(!c.is_skipped(&Options::default()));
        let sources = c.discover(Path::new("/p"), &Options::default()).unwrap();
        assert_eq!(sources.len(), 1);
    }

    #[test]
    fn platform_gate() {
        let all = Options::default();
        let android = Options::default().with_platforms([Platform::Android]);
        assert!(platform_enabled(&IosOnly, &all));
        assert!(!platform_enabled(&IosOnly, &android));

        let ungated = FnCollaborator::new("any", |_: &Path, _: &Options| Ok(Vec::new()));
        assert!(platform_enabled(&ungated, &android));
    }
}
