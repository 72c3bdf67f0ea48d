//! Octocrab client wrapper.
//!
//! One client serves every configured repository; effects name their
//! repository themselves.

use octocrab::Octocrab;

use crate::config::GitHubConfig;
use crate::retry::RetryConfig;

use super::error::GitHubApiError;

/// A GitHub API client with its retry settings.
#[derive(Clone)]
pub struct OctocrabClient {
    client: Octocrab,
    retry: RetryConfig,
}

impl OctocrabClient {
    pub fn new(client: Octocrab, retry: RetryConfig) -> Self {
        Self { client, retry }
    }

    /// Builds a client from the `[github]` configuration section.
    ///
    /// Without a token the client is unauthenticated and every mutation will
    /// fail with a permanent error.
    pub fn from_config(config: &GitHubConfig, retry: RetryConfig) -> Result<Self, GitHubApiError> {
        let mut builder = Octocrab::builder();
        if let Some(token) = &config.token {
            builder = builder.personal_token(token.clone());
        }
        if let Some(api_url) = &config.api_url {
            builder = builder
                .base_uri(api_url.as_str())
                .map_err(GitHubApiError::from_octocrab)?;
        }
        let client = builder.build().map_err(GitHubApiError::from_octocrab)?;
        Ok(Self::new(client, retry))
    }

    /// Returns a reference to the underlying octocrab client.
    pub fn inner(&self) -> &Octocrab {
        &self.client
    }

    pub fn retry_config(&self) -> RetryConfig {
        self.retry
    }
}

impl std::fmt::Debug for OctocrabClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OctocrabClient")
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}
