#![allow(dead_code)]

use natprint_config::Options;
use natprint_fingerprint::{Collaborator, FnCollaborator, HashSource};
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Writes `content` to `root/rel`, creating parent directories.
pub fn write(root: &Path, rel: &str, content: &[u8]) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// A small bare native project.
pub fn native_project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "android/app/build.gradle", b"apply plugin: 'com.android.application'\n");
    write(dir.path(), "android/settings.gradle", b"include ':app'\n");
    write(dir.path(), "ios/Podfile", b"platform :ios, '13.4'\n");
    write(dir.path(), "ios/App/AppDelegate.mm", b"#import \"AppDelegate.h\"\n");
    write(dir.path(), ".gitignore", b"node_modules\n");
    dir
}

/// A collaborator that always returns `sources`.
pub fn fixed(name: &'static str, sources: Vec<HashSource>) -> Arc<dyn Collaborator> {
    Arc::new(FnCollaborator::new(name, move |_: &Path, _: &Options| {
        Ok(sources.clone())
    }))
}

/// The three sources of the canonical end-to-end scenario.
pub fn scenario_collaborators() -> Vec<Arc<dyn Collaborator>> {
    vec![
        fixed(
            "bareNativeDirs",
            vec![
                HashSource::dir("android", "bareNativeDir"),
                HashSource::dir("ios", "bareNativeDir"),
            ],
        ),
        fixed(
            "packageJsonScripts",
            vec![HashSource::contents(
                "packageJson:scripts",
                r#"{"start":"expo start"}"#,
                "packageJson:scripts",
            )],
        ),
    ]
}
