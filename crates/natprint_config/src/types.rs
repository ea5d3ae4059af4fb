//! Option types consulted by the fingerprint builder and its collaborators.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// A target platform that platform-gated collaborators are restricted to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Android (Gradle) native project.
    Android,
    /// iOS (Xcode/CocoaPods) native project.
    Ios,
}

impl Platform {
    /// Every recognized platform.
    pub const ALL: [Platform; 2] = [Platform::Android, Platform::Ios];

    /// Returns the lowercase name used in configuration files.
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Android => "android",
            Platform::Ios => "ios",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownPlatform(s.to_string()))
    }
}

/// One category of source that can be excluded from the fingerprint.
///
/// The set is closed: configuration naming any other flag is rejected. Flags
/// for categories without an in-tree collaborator are still recognized so that
/// external collaborators can honor them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SourceSkip {
    /// Versions in the app config (`version`, `android.versionCode`, `ios.buildNumber`).
    ExpoConfigVersions,
    /// The `runtimeVersion` field of the app config.
    ExpoConfigRuntimeVersionField,
    /// App names and slugs.
    ExpoConfigNames,
    /// The Android package name.
    ExpoConfigAndroidPackage,
    /// The iOS bundle identifier.
    ExpoConfigIosBundleIdentifier,
    /// Deep-link schemes.
    ExpoConfigSchemes,
    /// The EAS project id.
    ExpoConfigEasProject,
    /// Asset files referenced from the app config.
    ExpoConfigAssets,
    /// The whole app config; implies every `ExpoConfig*` flag.
    ExpoConfigAll,
    /// The `extra` section of the app config.
    ExpoConfigExtraSection,
    /// `android`/`ios` package.json scripts that do not invoke a native run.
    PackageJsonAndroidAndIosScriptsIfNotContainRun,
    /// All package.json scripts.
    PackageJsonScriptsAll,
    /// The project `.gitignore`.
    GitIgnore,
}

impl SourceSkip {
    /// Every recognized flag.
    pub const ALL: [SourceSkip; 13] = [
        SourceSkip::ExpoConfigVersions,
        SourceSkip::ExpoConfigRuntimeVersionField,
        SourceSkip::ExpoConfigNames,
        SourceSkip::ExpoConfigAndroidPackage,
        SourceSkip::ExpoConfigIosBundleIdentifier,
        SourceSkip::ExpoConfigSchemes,
        SourceSkip::ExpoConfigEasProject,
        SourceSkip::ExpoConfigAssets,
        SourceSkip::ExpoConfigAll,
        SourceSkip::ExpoConfigExtraSection,
        SourceSkip::PackageJsonAndroidAndIosScriptsIfNotContainRun,
        SourceSkip::PackageJsonScriptsAll,
        SourceSkip::GitIgnore,
    ];

    /// Returns the kebab-case name used in configuration files and on the CLI.
    pub fn as_str(self) -> &'static str {
        match self {
            SourceSkip::ExpoConfigVersions => "expo-config-versions",
            SourceSkip::ExpoConfigRuntimeVersionField => "expo-config-runtime-version-field",
            SourceSkip::ExpoConfigNames => "expo-config-names",
            SourceSkip::ExpoConfigAndroidPackage => "expo-config-android-package",
            SourceSkip::ExpoConfigIosBundleIdentifier => "expo-config-ios-bundle-identifier",
            SourceSkip::ExpoConfigSchemes => "expo-config-schemes",
            SourceSkip::ExpoConfigEasProject => "expo-config-eas-project",
            SourceSkip::ExpoConfigAssets => "expo-config-assets",
            SourceSkip::ExpoConfigAll => "expo-config-all",
            SourceSkip::ExpoConfigExtraSection => "expo-config-extra-section",
            SourceSkip::PackageJsonAndroidAndIosScriptsIfNotContainRun => {
                "package-json-android-and-ios-scripts-if-not-contain-run"
            }
            SourceSkip::PackageJsonScriptsAll => "package-json-scripts-all",
            SourceSkip::GitIgnore => "git-ignore",
        }
    }

    fn is_expo_config(self) -> bool {
        matches!(
            self,
            SourceSkip::ExpoConfigVersions
                | SourceSkip::ExpoConfigRuntimeVersionField
                | SourceSkip::ExpoConfigNames
                | SourceSkip::ExpoConfigAndroidPackage
                | SourceSkip::ExpoConfigIosBundleIdentifier
                | SourceSkip::ExpoConfigSchemes
                | SourceSkip::ExpoConfigEasProject
                | SourceSkip::ExpoConfigAssets
                | SourceSkip::ExpoConfigExtraSection
        )
    }
}

impl fmt::Display for SourceSkip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceSkip {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SourceSkip::ALL
            .into_iter()
            .find(|flag| flag.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownFlag(s.to_string()))
    }
}

/// A set of independently toggleable [`SourceSkip`] flags.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceSkips(BTreeSet<SourceSkip>);

impl SourceSkips {
    /// Creates an empty set (nothing skipped).
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses flag names, rejecting any unknown name.
    pub fn parse<I, S>(names: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut skips = Self::new();
        for name in names {
            skips.insert(name.as_ref().parse()?);
        }
        Ok(skips)
    }

    /// Adds a flag.
    pub fn insert(&mut self, flag: SourceSkip) {
        self.0.insert(flag);
    }

    /// Returns `true` if `flag` is set, directly or through `ExpoConfigAll`.
    pub fn contains(&self, flag: SourceSkip) -> bool {
        self.0.contains(&flag)
            || (flag.is_expo_config() && self.0.contains(&SourceSkip::ExpoConfigAll))
    }

    /// Returns `true` if no flag is set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the explicitly set flags in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = SourceSkip> + '_ {
        self.0.iter().copied()
    }

    /// Adds every flag of `other`.
    pub fn extend(&mut self, other: &SourceSkips) {
        self.0.extend(other.iter());
    }
}

impl FromIterator<SourceSkip> for SourceSkips {
    fn from_iter<T: IntoIterator<Item = SourceSkip>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A source declared directly in configuration rather than discovered.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", deny_unknown_fields)]
pub enum ExtraSource {
    /// A single file, relative to the project root.
    File {
        /// Project-relative path.
        path: String,
        /// Provenance labels; defaults to `extraSources`.
        #[serde(default)]
        reasons: Vec<String>,
    },
    /// A directory subtree, relative to the project root.
    Dir {
        /// Project-relative path.
        path: String,
        /// Provenance labels; defaults to `extraSources`.
        #[serde(default)]
        reasons: Vec<String>,
    },
    /// Literal contents identified by an id.
    Contents {
        /// Identifier unique among contents sources.
        id: String,
        /// The literal text to hash.
        contents: String,
        /// Provenance labels; defaults to `extraSources`.
        #[serde(default)]
        reasons: Vec<String>,
    },
}

/// The raw `natprint.toml` file as written by the user.
///
/// Every field is optional; unknown keys are rejected so that a misspelled
/// option never silently falls back to its default.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Platform names (`android`, `ios`).
    pub platforms: Option<Vec<String>>,
    /// Source-skip flag names.
    #[serde(default)]
    pub skip: Vec<String>,
    /// Additional ignore patterns, appended to the defaults.
    #[serde(default)]
    pub ignore_paths: Vec<String>,
    /// Replace the default ignore patterns instead of extending them.
    #[serde(default)]
    pub no_default_ignore_paths: bool,
    /// Worker pool size for discovery and hashing.
    pub concurrent_io_limit: Option<usize>,
    /// Normalize CRLF to LF in text content before hashing.
    pub normalize_line_endings: Option<bool>,
    /// Attach per-file debug information to directory sources.
    #[serde(default)]
    pub debug: bool,
    /// Abort the build when any collaborator fails.
    #[serde(default)]
    pub fatal_discovery_errors: bool,
    /// Sources declared directly in configuration.
    #[serde(default)]
    pub extra_sources: Vec<ExtraSource>,
}

/// Built-in ignore patterns for build outputs and per-machine files.
pub const DEFAULT_IGNORE_PATHS: &[&str] = &[
    "**/android/build",
    "**/android/.cxx",
    "**/android/.gradle",
    "**/android/app/build",
    "**/android/local.properties",
    "**/android/.idea",
    "**/android/**/.idea",
    "**/android/gradlew",
    "**/android/gradlew.bat",
    "**/android/gradle/wrapper/gradle-wrapper.jar",
    "**/ios/Pods",
    "**/ios/build",
    "**/ios/.xcode.env.local",
    "**/ios/**/project.xcworkspace",
    "**/ios/*.xcworkspace/xcuserdata",
    "**/.DS_Store",
    "**/node_modules/**/node_modules",
    "**/node_modules/**/*.node",
];

/// Returns the built-in ignore patterns as owned strings.
pub fn default_ignore_paths() -> Vec<String> {
    DEFAULT_IGNORE_PATHS.iter().map(|p| p.to_string()).collect()
}

/// Fully resolved, validated options for one fingerprint build.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Options {
    /// Platforms that platform-gated collaborators may run for.
    pub platforms: BTreeSet<Platform>,
    /// Source categories to exclude.
    pub source_skips: SourceSkips,
    /// Gitignore-style patterns, project-relative, applied to file and dir sources.
    pub ignore_paths: Vec<String>,
    /// Worker pool size; `None` uses the available parallelism.
    pub concurrent_io_limit: Option<usize>,
    /// Normalize CRLF to LF in text content before hashing.
    pub normalize_line_endings: bool,
    /// Attach per-file debug information to directory sources.
    pub debug: bool,
    /// Abort the build when any collaborator fails.
    pub fatal_discovery_errors: bool,
    /// Sources declared directly in configuration.
    pub extra_sources: Vec<ExtraSource>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            platforms: Platform::ALL.into_iter().collect(),
            source_skips: SourceSkips::new(),
            ignore_paths: default_ignore_paths(),
            concurrent_io_limit: None,
            normalize_line_endings: true,
            debug: false,
            fatal_discovery_errors: false,
            extra_sources: Vec::new(),
        }
    }
}

impl Options {
    /// Restricts discovery to the given platforms.
    pub fn with_platforms(mut self, platforms: impl IntoIterator<Item = Platform>) -> Self {
        self.platforms = platforms.into_iter().collect();
        self
    }

    /// Sets a source-skip flag.
    pub fn with_skip(mut self, flag: SourceSkip) -> Self {
        self.source_skips.insert(flag);
        self
    }

    /// Appends an ignore pattern.
    pub fn with_ignore_path(mut self, pattern: impl Into<String>) -> Self {
        self.ignore_paths.push(pattern.into());
        self
    }

    /// Sets the worker pool size.
    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.concurrent_io_limit = Some(limit);
        self
    }

    /// Returns `true` if `platform` is enabled.
    pub fn has_platform(&self, platform: Platform) -> bool {
        self.platforms.contains(&platform)
    }

    /// Returns `true` if `flag` is set.
    pub fn skips(&self, flag: SourceSkip) -> bool {
        self.source_skips.contains(flag)
    }

    /// Returns the effective worker pool size.
    pub fn worker_count(&self) -> usize {
        self.concurrent_io_limit.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    /// Checks value constraints that the type system cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrent_io_limit == Some(0) {
            return Err(ConfigError::ValidationError(
                "concurrent_io_limit must be at least 1".to_string(),
            ));
        }
        for extra in &self.extra_sources {
            let empty = match extra {
                ExtraSource::File { path, .. } | ExtraSource::Dir { path, .. } => path.is_empty(),
                ExtraSource::Contents { id, .. } => id.is_empty(),
            };
            if empty {
                return Err(ConfigError::ValidationError(
                    "extra source with empty path or id".to_string(),
                ));
            }
        }
        Ok(())
    }
}
