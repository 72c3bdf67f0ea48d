//! Configuration model.
//!
//! `Raw*` types mirror the TOML file one-to-one and are only deserialized.
//! [`ConfigFile`] is the validated form the rest of the service consumes; it
//! is built once at startup via `TryFrom<RawConfigFile>` and never mutated.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;

use super::ConfigError;
use super::registry::RepoConfigs;
use crate::retry::RetryConfig;
use crate::types::RepoName;

/// Address the HTTP server binds to when none is configured.
pub const DEFAULT_BIND: &str = "0.0.0.0:5000";

/// Commit status context reported to GitHub when none is configured.
pub const DEFAULT_STATUS_CONTEXT: &str = "jenkins";

// ─── Raw (file) form ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub server: RawServerConfig,
    #[serde(default)]
    pub github: RawGitHubConfig,
    pub jenkins: RawJenkinsConfig,
    #[serde(default)]
    pub retry: RawRetryConfig,
    #[serde(default)]
    pub repos: Vec<RawRepoConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawServerConfig {
    pub bind: Option<String>,
    /// Externally reachable base URL of this service, used for hook registration.
    pub public_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawGitHubConfig {
    /// API base URL; set for GitHub Enterprise.
    pub api_url: Option<String>,
    pub token: Option<String>,
    pub webhook_secret: Option<String>,
    pub status_context: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawJenkinsConfig {
    pub url: String,
    pub user: Option<String>,
    pub api_token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawRetryConfig {
    pub max_retries: Option<u32>,
    pub initial_delay_ms: Option<u64>,
    pub max_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawRepoConfig {
    pub github_repo: String,
    pub jenkins_job: String,
    #[serde(default = "default_build_all_commits")]
    pub build_all_commits: bool,
    pub status_context: Option<String>,
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

fn default_build_all_commits() -> bool {
    true
}

// ─── Validated form ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub server: ServerConfig,
    pub github: GitHubConfig,
    pub jenkins: JenkinsConfig,
    pub retry: RetryConfig,
    pub repos: RepoConfigs,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub public_url: Option<String>,
}

#[derive(Clone, PartialEq, Eq)]
pub struct GitHubConfig {
    pub api_url: Option<String>,
    pub token: Option<String>,
    pub webhook_secret: Option<String>,
}

// Credentials stay out of logs.
impl std::fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("api_url", &self.api_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("webhook_secret", &self.webhook_secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct JenkinsConfig {
    pub url: String,
    pub user: Option<String>,
    pub api_token: Option<String>,
}

impl std::fmt::Debug for JenkinsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JenkinsConfig")
            .field("url", &self.url)
            .field("user", &self.user)
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Build and status configuration for one source repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoConfig {
    /// The repository this configuration governs (`owner/name`).
    pub github_repo: RepoName,

    /// The Jenkins job triggered for commits of this repository.
    pub jenkins_job: String,

    /// Build every commit of a pull request update (`true`) or only its head.
    pub build_all_commits: bool,

    /// Context string attached to commit statuses.
    pub status_context: String,

    /// Extra parameters passed to the Jenkins job on every trigger.
    pub parameters: BTreeMap<String, String>,
}

impl RepoConfig {
    /// Creates a configuration with default settings: all commits are built
    /// and statuses use [`DEFAULT_STATUS_CONTEXT`].
    pub fn new(github_repo: RepoName, jenkins_job: impl Into<String>) -> Self {
        RepoConfig {
            github_repo,
            jenkins_job: jenkins_job.into(),
            build_all_commits: true,
            status_context: DEFAULT_STATUS_CONTEXT.to_string(),
            parameters: BTreeMap::new(),
        }
    }

    pub fn with_build_all_commits(mut self, build_all_commits: bool) -> Self {
        self.build_all_commits = build_all_commits;
        self
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }
}

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = ConfigError;

    fn try_from(raw: RawConfigFile) -> Result<Self, Self::Error> {
        let bind_str = raw.server.bind.as_deref().unwrap_or(DEFAULT_BIND);
        let bind = bind_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid(format!("server.bind '{}': {}", bind_str, e)))?;

        let public_url = raw
            .server
            .public_url
            .map(|url| url.trim_end_matches('/').to_string());

        let jenkins_url = raw.jenkins.url.trim().trim_end_matches('/').to_string();
        if jenkins_url.is_empty() {
            return Err(ConfigError::Invalid("jenkins.url must not be empty".into()));
        }

        let default_context = raw
            .github
            .status_context
            .clone()
            .unwrap_or_else(|| DEFAULT_STATUS_CONTEXT.to_string());

        let mut repos = Vec::with_capacity(raw.repos.len());
        for raw_repo in raw.repos {
            repos.push(validate_repo(raw_repo, &default_context)?);
        }

        Ok(ConfigFile {
            server: ServerConfig { bind, public_url },
            github: GitHubConfig {
                api_url: raw.github.api_url,
                token: raw.github.token,
                webhook_secret: raw.github.webhook_secret,
            },
            jenkins: JenkinsConfig {
                url: jenkins_url,
                user: raw.jenkins.user,
                api_token: raw.jenkins.api_token,
            },
            retry: retry_from_raw(&raw.retry),
            repos: RepoConfigs::new(repos)?,
        })
    }
}

fn validate_repo(raw: RawRepoConfig, default_context: &str) -> Result<RepoConfig, ConfigError> {
    let github_repo = RepoName::parse(raw.github_repo)?;

    let jenkins_job = raw.jenkins_job.trim().trim_matches('/').to_string();
    if jenkins_job.is_empty() {
        return Err(ConfigError::Invalid(format!(
            "repos[{}].jenkins_job must not be empty",
            github_repo
        )));
    }

    Ok(RepoConfig {
        github_repo,
        jenkins_job,
        build_all_commits: raw.build_all_commits,
        status_context: raw
            .status_context
            .unwrap_or_else(|| default_context.to_string()),
        parameters: raw.parameters,
    })
}

fn retry_from_raw(raw: &RawRetryConfig) -> RetryConfig {
    let defaults = RetryConfig::DEFAULT;
    RetryConfig {
        max_retries: raw.max_retries.unwrap_or(defaults.max_retries),
        initial_delay: raw
            .initial_delay_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.initial_delay),
        max_delay: raw
            .max_delay_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.max_delay),
    }
}
