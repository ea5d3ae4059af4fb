//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::ignore::{parse_ignore_file, IGNORE_FILE};
use crate::types::ProjectConfig;
use std::path::Path;

/// Name of the optional configuration file at the project root.
pub const CONFIG_FILE: &str = "natprint.toml";

/// Loads `<project_dir>/natprint.toml`, or defaults if the file does not exist.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    let config_path = project_dir.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(ProjectConfig::default());
    }
    load_config_file(&config_path)
}

/// Loads a configuration file from an explicit path; the file must exist.
pub fn load_config_file(path: &Path) -> Result<ProjectConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parses and validates a configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Reads `<project_dir>/.fingerprintignore`, returning no patterns if absent.
pub fn load_ignore_file(project_dir: &Path) -> Result<Vec<String>, ConfigError> {
    let path = project_dir.join(IGNORE_FILE);
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(&path)?;
    Ok(parse_ignore_file(&content))
}

/// Validates that flag and platform names belong to the recognized sets.
fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    for name in &config.skip {
        name.parse::<crate::types::SourceSkip>()?;
    }
    for name in config.platforms.iter().flatten() {
        name.parse::<crate::types::Platform>()?;
    }
    if config.concurrent_io_limit == Some(0) {
        return Err(ConfigError::ValidationError(
            "concurrent_io_limit must be at least 1".to_string(),
        ));
    }
    Ok(())
}
