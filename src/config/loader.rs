//! Loading the configuration file from disk.

use std::fs;
use std::path::{Path, PathBuf};

use super::ConfigError;
use super::model::{ConfigFile, RawConfigFile};

/// Environment variable naming the configuration file.
pub const CONFIG_ENV_VAR: &str = "JENKINS_RELAY_CONFIG";

/// Reads and deserializes the TOML file without semantic validation.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile, ConfigError> {
    let contents = fs::read_to_string(path.as_ref())?;
    parse_str(&contents)
}

/// Deserializes TOML text without semantic validation.
pub fn parse_str(contents: &str) -> Result<RawConfigFile, ConfigError> {
    Ok(toml::from_str(contents)?)
}

/// Loads the configuration file and validates it.
///
/// This is the entry point used at startup: repository identifiers must be
/// `owner/name`, each repository may appear only once, and the Jenkins URL
/// must be set.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile, ConfigError> {
    let raw = load_from_path(path)?;
    ConfigFile::try_from(raw)
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("jenkins-relay.toml")
}
