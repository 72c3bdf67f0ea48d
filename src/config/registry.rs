//! Repository configuration lookup.
//!
//! [`RepoConfigs`] is the resolver every inbound event goes through: given a
//! repository identifier taken from a payload, it returns the configuration
//! governing that repository. Lookups are exact string matches.

use std::collections::HashMap;

use thiserror::Error;

use super::ConfigError;
use super::model::RepoConfig;
use crate::types::RepoName;

/// The repository an event referred to has no configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("No repo config for {0}")]
pub struct UnknownRepository(pub RepoName);

/// Immutable set of repository configurations, keyed by repository identifier.
///
/// Constructed once at startup and shared read-only between requests.
#[derive(Debug, Clone, Default)]
pub struct RepoConfigs {
    by_repo: HashMap<RepoName, RepoConfig>,
}

impl RepoConfigs {
    /// Builds the lookup table, rejecting a second configuration for the
    /// same repository.
    pub fn new(configs: impl IntoIterator<Item = RepoConfig>) -> Result<Self, ConfigError> {
        let mut by_repo = HashMap::new();
        for config in configs {
            let repo = config.github_repo.clone();
            if by_repo.insert(repo.clone(), config).is_some() {
                return Err(ConfigError::DuplicateRepo(repo));
            }
        }
        Ok(RepoConfigs { by_repo })
    }

    /// Resolves the configuration for `repo`.
    pub fn resolve(&self, repo: &RepoName) -> Result<&RepoConfig, UnknownRepository> {
        self.by_repo
            .get(repo)
            .ok_or_else(|| UnknownRepository(repo.clone()))
    }

    /// Iterates over all configurations in repository-name order.
    pub fn iter(&self) -> impl Iterator<Item = &RepoConfig> {
        let mut configs: Vec<_> = self.by_repo.values().collect();
        configs.sort_by(|a, b| a.github_repo.cmp(&b.github_repo));
        configs.into_iter()
    }

    pub fn len(&self) -> usize {
        self.by_repo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_repo.is_empty()
    }
}
