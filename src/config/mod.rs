//! Service configuration: the TOML file model, its loader, and the
//! repository resolver built from it.

pub mod loader;
pub mod model;
pub mod registry;

use thiserror::Error;

use crate::types::{InvalidRepoName, RepoName};

pub use loader::{CONFIG_ENV_VAR, default_config_path, load_and_validate};
pub use model::{ConfigFile, GitHubConfig, JenkinsConfig, RepoConfig, ServerConfig};
pub use registry::{RepoConfigs, UnknownRepository};

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    InvalidRepo(#[from] InvalidRepoName),

    #[error("repository {0} is configured more than once")]
    DuplicateRepo(RepoName),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
