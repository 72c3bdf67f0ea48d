//! Handler for `pull_request` webhook events.
//!
//! Handling is split in two because the commits to build may have to be
//! fetched from GitHub first:
//!
//! 1. [`handle_pull_request`] filters the action and resolves the
//!    configuration, producing a [`BuildPlan`]
//! 2. [`BuildPlan::fan_out`] turns the commit list into effects: for each
//!    commit in order, a pending status and then a build request

use tracing::{debug, warn};

use crate::config::{RepoConfig, RepoConfigs};
use crate::effects::{
    BuildScheduleRequest, CommitStatusUpdate, Effect, GitHubEffect, JenkinsEffect,
};
use crate::status::{CommitState, SCHEDULED_DESCRIPTION};
use crate::types::{RepoName, Sha};
use crate::webhooks::events::{PrSide, PullRequestEvent};

use super::HandlerError;

/// What to do about a pull request event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullRequestDecision<'a> {
    /// The action does not introduce new code.
    Ignored { reason: String },

    /// Build the pull request's commits.
    Build(BuildPlan<'a>),
}

/// A pull request whose commits are to be built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPlan<'a> {
    pub config: &'a RepoConfig,
    pub event: &'a PullRequestEvent,
    /// Repository the commits come from.
    pub head_repo: RepoName,
}

impl BuildPlan<'_> {
    /// The GitHub query listing the commits to build, or `None` when only the
    /// head commit is built.
    pub fn commit_query(&self) -> Option<GitHubEffect> {
        self.config
            .build_all_commits
            .then(|| GitHubEffect::ListPullRequestCommits {
                repo: self.config.github_repo.clone(),
                pr: self.event.pr_number,
            })
    }

    /// The commits to build when no query is needed.
    pub fn head_only(&self) -> Vec<Sha> {
        vec![self.event.head_sha.clone()]
    }

    /// Effects for the given commits: a pending status before each build.
    pub fn fan_out(&self, shas: &[Sha]) -> Vec<Effect> {
        shas.iter()
            .flat_map(|sha| [self.pending_status(sha), self.schedule_build(sha)])
            .collect()
    }

    fn pending_status(&self, sha: &Sha) -> Effect {
        Effect::GitHub(GitHubEffect::CreateStatus(CommitStatusUpdate {
            repo: self.config.github_repo.clone(),
            sha: sha.clone(),
            state: CommitState::Pending,
            description: SCHEDULED_DESCRIPTION.to_string(),
            target_url: None,
            context: self.config.status_context.clone(),
        }))
    }

    fn schedule_build(&self, sha: &Sha) -> Effect {
        Effect::Jenkins(JenkinsEffect::ScheduleBuild(BuildScheduleRequest {
            job_name: self.config.jenkins_job.clone(),
            base_repo: self.config.github_repo.clone(),
            head_repo: self.head_repo.clone(),
            sha: sha.clone(),
            review_url: self.event.html_url.clone(),
            extra_parameters: self.config.parameters.clone(),
        }))
    }
}

/// Handles a pull request event.
///
/// Only `opened` and `synchronize` build anything. The configuration is
/// resolved by the pull request's head repository.
pub fn handle_pull_request<'a>(
    event: &'a PullRequestEvent,
    repos: &'a RepoConfigs,
) -> Result<PullRequestDecision<'a>, HandlerError> {
    if !event.action.triggers_build() {
        debug!(pr = %event.pr_number, action = %event.action, "Ignoring pull request action");
        return Ok(PullRequestDecision::Ignored {
            reason: format!("pull request action {}", event.action),
        });
    }

    let head_repo = event
        .repo(PrSide::Head)
        .cloned()
        .ok_or(HandlerError::MissingField("pull_request.head.repo"))?;

    let config = repos.resolve(&head_repo).inspect_err(|e| {
        warn!(repo = %head_repo, pr = %event.pr_number, "{}", e);
    })?;

    debug!(
        repo = %config.github_repo,
        pr = %event.pr_number,
        url = %event.html_url,
        action = %event.action,
        fork = event.is_from_fork(),
        "Building pull request"
    );

    Ok(PullRequestDecision::Build(BuildPlan {
        config,
        event,
        head_repo,
    }))
}
