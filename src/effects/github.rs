//! GitHub API effect types.
//!
//! Every variant names its repository explicitly; one interpreter serves all
//! configured repositories with a single set of credentials.

use serde::{Deserialize, Serialize};

use crate::status::CommitState;
use crate::types::{PrNumber, RepoName, Sha};

/// A commit status to publish.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommitStatusUpdate {
    pub repo: RepoName,
    pub sha: Sha,
    pub state: CommitState,
    pub description: String,

    /// Link shown next to the status, normally the Jenkins build page.
    pub target_url: Option<String>,

    /// Status context; statuses with different contexts coexist on a commit.
    pub context: String,
}

/// Shared secret GitHub signs webhook deliveries with.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WebhookSecret(pub String);

impl std::fmt::Debug for WebhookSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("WebhookSecret(<redacted>)")
    }
}

/// A webhook already installed on a repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HookData {
    pub id: u64,
    /// Delivery URL; absent for non-HTTP hooks.
    pub url: Option<String>,
    pub events: Vec<String>,
    pub active: bool,
}

/// A GitHub API effect.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GitHubEffect {
    /// List the commits of a pull request, oldest first.
    ListPullRequestCommits { repo: RepoName, pr: PrNumber },

    /// Publish a commit status.
    CreateStatus(CommitStatusUpdate),

    /// List the webhooks installed on a repository.
    ListHooks { repo: RepoName },

    /// Install a webhook delivering `events` to `url`.
    CreateHook {
        repo: RepoName,
        url: String,
        events: Vec<String>,
        secret: Option<WebhookSecret>,
    },
}

impl GitHubEffect {
    /// The repository the effect targets.
    pub fn repo(&self) -> &RepoName {
        match self {
            GitHubEffect::ListPullRequestCommits { repo, .. }
            | GitHubEffect::ListHooks { repo }
            | GitHubEffect::CreateHook { repo, .. } => repo,
            GitHubEffect::CreateStatus(update) => &update.repo,
        }
    }
}

/// Response from a GitHub effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GitHubResponse {
    /// Commit SHAs of a pull request, oldest first.
    Commits { shas: Vec<Sha> },

    Hooks { hooks: Vec<HookData> },

    /// The mutation succeeded.
    Ok,
}
