//! Sources declared directly in configuration.

use natprint_config::{ExtraSource, Options};
use natprint_fingerprint::{Collaborator, DiscoveryError, HashSource};
use std::path::Path;

/// Reason attached to declared sources that name none.
pub const EXTRA_SOURCES_REASON: &str = "extraSources";

/// Contributes `Options::extra_sources`.
pub struct ExtraSources;

impl Collaborator for ExtraSources {
    fn name(&self) -> &str {
        "extraSources"
    }

    fn discover(
        &self,
        _project_root: &Path,
        options: &Options,
    ) -> Result<Vec<HashSource>, DiscoveryError> {
        Ok(options.extra_sources.iter().map(to_hash_source).collect())
    }
}

fn to_hash_source(extra: &ExtraSource) -> HashSource {
    let (mut source, reasons) = match extra {
        ExtraSource::File { path, reasons } => {
            (HashSource::file(path.as_str(), EXTRA_SOURCES_REASON), reasons)
        }
        ExtraSource::Dir { path, reasons } => {
            (HashSource::dir(path.as_str(), EXTRA_SOURCES_REASON), reasons)
        }
        ExtraSource::Contents {
            id,
            contents,
            reasons,
        } => (
            HashSource::contents(id.as_str(), contents.as_str(), EXTRA_SOURCES_REASON),
            reasons,
        ),
    };
    if !reasons.is_empty() {
        source.reasons = reasons.iter().cloned().collect();
    }
    source
}
