//! Reference collaborators that discover fingerprint sources in a project.
//!
//! These cover bare native directories, `package.json` scripts, the project
//! `.gitignore`, and sources declared in configuration. None of them spawn
//! external processes.

#![warn(missing_docs)]

pub mod bare;
pub mod extra;
pub mod package_json;

use natprint_fingerprint::{Collaborator, HashSource};
use std::path::Path;
use std::sync::Arc;

pub use bare::{BareNativeDir, GitIgnore};
pub use extra::ExtraSources;
pub use package_json::{normalize_scripts, PackageJsonScripts};

/// Returns every in-tree collaborator.
pub fn default_collaborators() -> Vec<Arc<dyn Collaborator>> {
    vec![
        Arc::new(BareNativeDir::android()),
        Arc::new(BareNativeDir::ios()),
        Arc::new(PackageJsonScripts),
        Arc::new(GitIgnore),
        Arc::new(ExtraSources),
    ]
}

/// Returns a file or dir source for `relative` depending on what exists on
/// disk, or `None` if nothing does.
pub fn file_based_source(project_root: &Path, relative: &str, reason: &str) -> Option<HashSource> {
    let metadata = std::fs::metadata(project_root.join(relative)).ok()?;
    if metadata.is_dir() {
        Some(HashSource::dir(relative, reason))
    } else if metadata.is_file() {
        Some(HashSource::file(relative, reason))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use natprint_config::Options;
    use natprint_diagnostics::DiagnosticSink;
    use natprint_fingerprint::FingerprintBuilder;
    use std::fs;

    #[test]
    fn file_based_source_detects_kind() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("android")).unwrap();
        fs::write(dir.path().join(".gitignore"), "x").unwrap();
        assert_eq!(
            file_based_source(dir.path(), "android", "r"),
            Some(HashSource::dir("android", "r"))
        );
        assert_eq!(
            file_based_source(dir.path(), ".gitignore", "r"),
            Some(HashSource::file(".gitignore", "r"))
        );
        assert!(file_based_source(dir.path(), "ios", "r").is_none());
    }

    #[test]
    fn default_collaborators_fingerprint_a_bare_project() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("android/app")).unwrap();
        fs::write(dir.path().join("android/app/build.gradle"), "apply").unwrap();
        fs::create_dir_all(dir.path().join("ios")).unwrap();
        fs::write(dir.path().join("ios/Podfile"), "pod").unwrap();
        fs::write(dir.path().join(".gitignore"), "node_modules\n").unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{"name":"app","scripts":{"start":"expo start"}}"#,
        )
        .unwrap();

        let sink = DiagnosticSink::new();
        let fp = FingerprintBuilder::new(Options::default())
            .with_collaborators(default_collaborators())
            .build(dir.path(), &sink)
            .unwrap();
        let keys: Vec<String> = fp.sources().iter().map(|s| s.key().to_string()).collect();
        assert_eq!(
            keys,
            vec![
                "file:.gitignore",
                "dir:android",
                "dir:ios",
                "contents:packageJson:scripts"
            ]
        );
        assert!(sink.diagnostics().is_empty());
    }
}
