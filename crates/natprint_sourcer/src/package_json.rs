//! The `scripts` section of `package.json`.

use natprint_config::{Options, SourceSkip};
use natprint_fingerprint::{Collaborator, DiscoveryError, HashSource};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::debug;

/// Contents id and reason of the scripts source.
pub const SCRIPTS_ID: &str = "packageJson:scripts";

const NAME: &str = "packageJsonScripts";

/// Contributes `package.json` scripts as compact JSON with sorted keys.
///
/// A missing or unreadable `package.json` contributes nothing; malformed JSON
/// is a discovery error.
pub struct PackageJsonScripts;

impl Collaborator for PackageJsonScripts {
    fn name(&self) -> &str {
        NAME
    }

    fn is_skipped(&self, options: &Options) -> bool {
        options.skips(SourceSkip::PackageJsonScriptsAll)
    }

    fn discover(
        &self,
        project_root: &Path,
        options: &Options,
    ) -> Result<Vec<HashSource>, DiscoveryError> {
        let path = project_root.join("package.json");
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "unable to read package.json");
                return Ok(Vec::new());
            }
        };
        let manifest: Value = serde_json::from_str(&content)
            .map_err(|e| DiscoveryError::new(NAME, format!("malformed package.json: {e}")))?;

        let scripts = match manifest.get("scripts") {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(Value::Object(scripts)) => scripts.clone(),
            Some(_) => {
                return Err(DiscoveryError::new(
                    NAME,
                    "package.json \"scripts\" is not an object",
                ))
            }
        };

        debug!("adding package.json contents scripts");
        let contents = normalize_scripts(scripts, options)
            .map_err(|e| DiscoveryError::new(NAME, e.to_string()))?;
        Ok(vec![HashSource::contents(SCRIPTS_ID, contents, SCRIPTS_ID)])
    }
}

/// Serializes scripts compactly with sorted keys.
///
/// With `package-json-android-and-ios-scripts-if-not-contain-run` set, the
/// `android` and `ios` scripts are removed unless they invoke a native run
/// other than the default `expo run:<platform>`.
pub fn normalize_scripts(
    mut scripts: Map<String, Value>,
    options: &Options,
) -> Result<String, serde_json::Error> {
    if options.skips(SourceSkip::PackageJsonAndroidAndIosScriptsIfNotContainRun) {
        for (key, default_run) in [("android", "expo run:android"), ("ios", "expo run:ios")] {
            let keep = scripts
                .get(key)
                .and_then(Value::as_str)
                .is_some_and(|script| script.contains("run") && script != default_run);
            if !keep {
                scripts.remove(key);
            }
        }
    }
    serde_json::to_string(&scripts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn project(package_json: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("package.json"), package_json).unwrap();
        dir
    }

    fn scripts(json: &str) -> Map<String, Value> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn scripts_become_sorted_compact_json() {
        let dir = project(r#"{"scripts": {"start": "expo start", "android": "expo run:android"}}"#);
        let sources = PackageJsonScripts
            .discover(dir.path(), &Options::default())
            .unwrap();
        assert_eq!(
            sources,
            vec![HashSource::contents(
                SCRIPTS_ID,
                r#"{"android":"expo run:android","start":"expo start"}"#,
                SCRIPTS_ID
            )]
        );
    }

    #[test]
    fn missing_package_json_contributes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(PackageJsonScripts
            .discover(dir.path(), &Options::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn package_json_without_scripts_contributes_nothing() {
        let dir = project(r#"{"name": "app"}"#);
        assert!(PackageJsonScripts
            .discover(dir.path(), &Options::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn malformed_package_json_is_discovery_error() {
        let dir = project("{ not json");
        let err = PackageJsonScripts
            .discover(dir.path(), &Options::default())
            .unwrap_err();
        assert_eq!(err.collaborator, "packageJsonScripts");
        assert!(err.message.starts_with("malformed package.json"));
    }

    #[test]
    fn skipped_by_scripts_all() {
        let options = Options::default().with_skip(SourceSkip::PackageJsonScriptsAll);
        assert!(PackageJsonScripts.is_skipped(&options));
        assert!(!PackageJsonScripts.is_skipped(&Options::default()));
    }

    #[test]
    fn native_run_scripts_filtered_when_flag_set() {
        let options = Options::default()
            .with_skip(SourceSkip::PackageJsonAndroidAndIosScriptsIfNotContainRun);
        let out = normalize_scripts(
            scripts(r#"{"android": "expo run:android", "ios": "expo start --ios", "start": "s"}"#),
            &options,
        )
        .unwrap();
        assert_eq!(out, r#"{"start":"s"}"#);

        let out = normalize_scripts(
            scripts(r#"{"android": "react-native run-android", "ios": "expo run:ios --device"}"#),
            &options,
        )
        .unwrap();
        assert_eq!(
            out,
            r#"{"android":"react-native run-android","ios":"expo run:ios --device"}"#
        );
    }

    #[test]
    fn native_scripts_kept_without_flag() {
        let out = normalize_scripts(
            scripts(r#"{"android": "expo start --android"}"#),
            &Options::default(),
        )
        .unwrap();
        assert_eq!(out, r#"{"android":"expo start --android"}"#);
    }
}
