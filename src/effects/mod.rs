//! Effects-as-data for the two collaborators: GitHub and Jenkins.
//!
//! Request handlers never talk to a collaborator directly. They return the
//! calls they want made as [`Effect`] values; the dispatcher executes them
//! through a [`GitHubInterpreter`] and a [`JenkinsInterpreter`]. Tests swap
//! in recording interpreters and assert on the exact call sequence.

use serde::{Deserialize, Serialize};

pub mod github;
pub mod interpreter;
pub mod jenkins;

pub use github::{CommitStatusUpdate, GitHubEffect, GitHubResponse, HookData, WebhookSecret};
pub use interpreter::{GitHubInterpreter, JenkinsInterpreter};
pub use jenkins::{BuildScheduleRequest, JenkinsEffect, JenkinsResponse};

/// A call to one of the collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect_type", rename_all = "snake_case")]
pub enum Effect {
    /// A GitHub API call.
    GitHub(GitHubEffect),
    /// A Jenkins API call.
    Jenkins(JenkinsEffect),
}

impl Effect {
    /// The repository the call concerns.
    pub fn repo(&self) -> &crate::types::RepoName {
        match self {
            Effect::GitHub(effect) => effect.repo(),
            Effect::Jenkins(JenkinsEffect::ScheduleBuild(request)) => &request.base_repo,
        }
    }
}
