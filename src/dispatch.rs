//! Effect execution for inbound notifications.
//!
//! The [`Dispatcher`] owns the two interpreters. For each notification it
//! runs the pure handler, then executes the resulting effects one at a time
//! in order. Execution is best-effort: a failed effect is logged and
//! recorded, and the remaining effects still run. Retries happen inside the
//! interpreters, never here.

use thiserror::Error;
use tracing::{debug, info, trace, warn};

use crate::config::RepoConfigs;
use crate::effects::{
    Effect, GitHubEffect, GitHubInterpreter, GitHubResponse, JenkinsInterpreter, JenkinsResponse,
};
use crate::jenkins::BuildEvent;
use crate::types::{PrNumber, RepoName, Sha};
use crate::webhooks::{
    HandlerError, HandlerResult, PullRequestDecision, PullRequestEvent, handle_build_event,
    handle_pull_request,
};

/// Result of executing one effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectResult {
    GitHub(GitHubResponse),
    Jenkins(JenkinsResponse),
}

/// A collaborator call failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EffectError {
    #[error("GitHub API error: {0}")]
    GitHub(String),

    #[error("Jenkins error: {0}")]
    Jenkins(String),
}

/// An effect that failed, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedEffect {
    pub effect: Effect,
    pub error: EffectError,
}

/// What happened to the effects of one notification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Effects that succeeded, in execution order.
    pub succeeded: Vec<Effect>,

    /// Effects that failed, in execution order.
    pub failed: Vec<FailedEffect>,
}

impl DispatchReport {
    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Final outcome of a notification that did not fail outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing to do.
    Ignored { reason: String },

    /// Every effect succeeded.
    Dispatched(DispatchReport),
}

/// Errors from handling a notification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The handler rejected the notification; nothing was dispatched.
    #[error(transparent)]
    Handler(#[from] HandlerError),

    /// Listing the pull request's commits failed; nothing was dispatched.
    #[error("failed to list commits of {repo} {pr}: {error}")]
    CommitListing {
        repo: RepoName,
        pr: PrNumber,
        error: EffectError,
    },

    /// At least one effect failed. All effects were attempted.
    #[error("{} of {} collaborator calls failed", .report.failed.len(), .report.attempted())]
    Incomplete { report: DispatchReport },
}

/// Executes handler effects against GitHub and Jenkins.
///
/// # Type Parameters
///
/// * `G` - The GitHub interpreter type
/// * `J` - The Jenkins interpreter type
#[derive(Debug, Clone)]
pub struct Dispatcher<G, J> {
    github: G,
    jenkins: J,
}

impl<G, J> Dispatcher<G, J>
where
    G: GitHubInterpreter + Sync,
    J: JenkinsInterpreter + Sync,
{
    pub fn new(github: G, jenkins: J) -> Self {
        Self { github, jenkins }
    }

    /// Handles a normalized Jenkins build notification.
    pub async fn handle_build_event(
        &self,
        event: &BuildEvent,
        repos: &RepoConfigs,
    ) -> Result<Outcome, DispatchError> {
        match handle_build_event(event, repos)? {
            HandlerResult::Ignored { reason } => Ok(Outcome::Ignored { reason }),
            HandlerResult::Effects(effects) => self.finish(self.execute_all(effects).await),
        }
    }

    /// Handles a GitHub pull request event.
    ///
    /// The commits to build are listed from GitHub first when the repository
    /// builds every commit; a failure there stops before anything is
    /// dispatched.
    pub async fn handle_pull_request(
        &self,
        event: &PullRequestEvent,
        repos: &RepoConfigs,
    ) -> Result<Outcome, DispatchError> {
        let plan = match handle_pull_request(event, repos)? {
            PullRequestDecision::Ignored { reason } => return Ok(Outcome::Ignored { reason }),
            PullRequestDecision::Build(plan) => plan,
        };

        let shas = match plan.commit_query() {
            Some(query) => self.list_commits(query, &plan.config.github_repo, event.pr_number).await?,
            None => plan.head_only(),
        };

        debug!(
            repo = %plan.config.github_repo,
            pr = %event.pr_number,
            count = shas.len(),
            "Triggering builds"
        );

        let report = self.execute_all(plan.fan_out(&shas)).await;
        if report.is_complete() {
            info!(
                repo = %plan.config.github_repo,
                pr = %event.pr_number,
                commits = shas.len(),
                "Scheduled pull request builds"
            );
        }
        self.finish(report)
    }

    async fn list_commits(
        &self,
        query: GitHubEffect,
        repo: &RepoName,
        pr: PrNumber,
    ) -> Result<Vec<Sha>, DispatchError> {
        let listing_error = |error: EffectError| {
            warn!(repo = %repo, pr = %pr, error = %error, "Failed to list pull request commits");
            DispatchError::CommitListing {
                repo: repo.clone(),
                pr,
                error,
            }
        };

        match self.github.interpret(query).await {
            Ok(GitHubResponse::Commits { shas }) => Ok(shas),
            Ok(other) => Err(listing_error(EffectError::GitHub(format!(
                "unexpected response: {:?}",
                other
            )))),
            Err(e) => Err(listing_error(EffectError::GitHub(e.to_string()))),
        }
    }

    /// Executes effects in order, continuing past failures.
    pub async fn execute_all(&self, effects: Vec<Effect>) -> DispatchReport {
        let mut report = DispatchReport::default();

        for effect in effects {
            match self.execute(effect.clone()).await {
                Ok(_) => report.succeeded.push(effect),
                Err(error) => {
                    warn!(repo = %effect.repo(), ?effect, error = %error, "Effect execution failed");
                    report.failed.push(FailedEffect { effect, error });
                }
            }
        }

        report
    }

    /// Executes a single effect.
    pub async fn execute(&self, effect: Effect) -> Result<EffectResult, EffectError> {
        trace!(?effect, "Executing effect");
        match effect {
            Effect::GitHub(effect) => self
                .github
                .interpret(effect)
                .await
                .map(EffectResult::GitHub)
                .map_err(|e| EffectError::GitHub(e.to_string())),
            Effect::Jenkins(effect) => self
                .jenkins
                .interpret(effect)
                .await
                .map(EffectResult::Jenkins)
                .map_err(|e| EffectError::Jenkins(e.to_string())),
        }
    }

    fn finish(&self, report: DispatchReport) -> Result<Outcome, DispatchError> {
        if report.is_complete() {
            Ok(Outcome::Dispatched(report))
        } else {
            Err(DispatchError::Incomplete { report })
        }
    }
}
