//! Option resolution: merging file configuration, ignore file, and overrides.

use crate::error::ConfigError;
use crate::loader::{load_config, load_config_file, load_ignore_file};
use crate::types::{default_ignore_paths, Options, Platform, ProjectConfig, SourceSkips};
use std::collections::BTreeSet;
use std::path::Path;

/// Command-line overrides layered on top of the configuration file.
///
/// Names are kept as strings until resolution so that unknown flags and
/// platforms are reported through [`ConfigError`].
#[derive(Debug, Default, Clone)]
pub struct OptionOverrides {
    /// Replaces the configured platforms when non-empty.
    pub platforms: Vec<String>,
    /// Added to the configured skip flags.
    pub skip: Vec<String>,
    /// Appended to the ignore patterns.
    pub ignore_paths: Vec<String>,
    /// Replaces the configured worker pool size.
    pub concurrent_io_limit: Option<usize>,
    /// Forces debug information on.
    pub debug: bool,
    /// Forces collaborator failures to be fatal.
    pub fatal_discovery_errors: bool,
}

/// Resolves the effective [`Options`].
///
/// Ignore patterns are layered: defaults (unless disabled), then the config
/// file, then `.fingerprintignore`, then overrides, so later `!pattern` lines can
/// re-include paths excluded earlier.
pub fn resolve_options(
    config: &ProjectConfig,
    ignore_file: &[String],
    overrides: &OptionOverrides,
) -> Result<Options, ConfigError> {
    let platform_names = if overrides.platforms.is_empty() {
        config.platforms.clone()
    } else {
        Some(overrides.platforms.clone())
    };
    let platforms = match platform_names {
        Some(names) => names
            .iter()
            .map(|n| n.parse::<Platform>())
            .collect::<Result<BTreeSet<_>, _>>()?,
        None => Platform::ALL.into_iter().collect(),
    };

    let mut source_skips = SourceSkips::parse(&config.skip)?;
    source_skips.extend(&SourceSkips::parse(&overrides.skip)?);

    let mut ignore_paths = if config.no_default_ignore_paths {
        Vec::new()
    } else {
        default_ignore_paths()
    };
    ignore_paths.extend(config.ignore_paths.iter().cloned());
    ignore_paths.extend(ignore_file.iter().cloned());
    ignore_paths.extend(overrides.ignore_paths.iter().cloned());

    let options = Options {
        platforms,
        source_skips,
        ignore_paths,
        concurrent_io_limit: overrides.concurrent_io_limit.or(config.concurrent_io_limit),
        normalize_line_endings: config.normalize_line_endings.unwrap_or(true),
        debug: config.debug || overrides.debug,
        fatal_discovery_errors: config.fatal_discovery_errors || overrides.fatal_discovery_errors,
        extra_sources: config.extra_sources.clone(),
    };
    options.validate()?;
    Ok(options)
}

/// Loads configuration and ignore file for `project_dir` and resolves options.
///
/// `config_path` selects an explicit configuration file instead of
/// `<project_dir>/natprint.toml`.
pub fn load_options(
    project_dir: &Path,
    config_path: Option<&Path>,
    overrides: &OptionOverrides,
) -> Result<Options, ConfigError> {
    let config = match config_path {
        Some(path) => load_config_file(path)?,
        None => load_config(project_dir)?,
    };
    let ignore_file = load_ignore_file(project_dir)?;
    resolve_options(&config, &ignore_file, overrides)
}
