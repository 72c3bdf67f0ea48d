//! GitHub webhook event types.
//!
//! Only `pull_request` deliveries are acted on. A pull request carries two
//! repositories: the base (where it will merge) and the head (where its
//! commits live, a fork for outside contributions).

use std::fmt;

use crate::types::{PrNumber, RepoName, Sha};

/// Action performed on a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PrAction {
    Opened,
    /// New commits were pushed to the head branch.
    Synchronize,
    Reopened,
    Closed,
    Edited,
    /// Any other action (`labeled`, `assigned`, ...).
    Other(String),
}

impl PrAction {
    pub fn parse(s: &str) -> Self {
        match s {
            "opened" => PrAction::Opened,
            "synchronize" => PrAction::Synchronize,
            "reopened" => PrAction::Reopened,
            "closed" => PrAction::Closed,
            "edited" => PrAction::Edited,
            other => PrAction::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PrAction::Opened => "opened",
            PrAction::Synchronize => "synchronize",
            PrAction::Reopened => "reopened",
            PrAction::Closed => "closed",
            PrAction::Edited => "edited",
            PrAction::Other(s) => s,
        }
    }

    /// Only opening a pull request and pushing to it trigger builds.
    pub fn triggers_build(&self) -> bool {
        matches!(self, PrAction::Opened | PrAction::Synchronize)
    }
}

impl fmt::Display for PrAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side of a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrSide {
    /// The repository the pull request merges into.
    Base,
    /// The repository the pull request's commits come from.
    Head,
}

/// A pull request event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestEvent {
    pub action: PrAction,
    pub pr_number: PrNumber,

    /// The pull request's page on GitHub.
    pub html_url: String,

    /// The current head commit.
    pub head_sha: Sha,

    pub base_repo: RepoName,

    /// `None` when the head repository (a fork) has been deleted.
    pub head_repo: Option<RepoName>,
}

impl PullRequestEvent {
    /// The repository on the given side, if it still exists.
    pub fn repo(&self, side: PrSide) -> Option<&RepoName> {
        match side {
            PrSide::Base => Some(&self.base_repo),
            PrSide::Head => self.head_repo.as_ref(),
        }
    }

    /// Returns true if the commits come from a different repository.
    pub fn is_from_fork(&self) -> bool {
        self.head_repo.as_ref() != Some(&self.base_repo)
    }
}
