//! Shared test utilities: recording interpreters and arbitrary generators for
//! property-based testing.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use proptest::prelude::*;
use thiserror::Error;

use crate::effects::{
    GitHubEffect, GitHubInterpreter, GitHubResponse, HookData, JenkinsEffect, JenkinsInterpreter,
    JenkinsResponse,
};
use crate::jenkins::{BuildPhase, BuildStatus};
use crate::types::{PrNumber, RepoName, Sha};

// ─── Recording interpreters ───────────────────────────────────────────────────

/// One collaborator call, as seen by a recording interpreter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GitHub(GitHubEffect),
    Jenkins(JenkinsEffect),
}

/// Call log shared by the recording interpreters so tests can assert on the
/// interleaving of GitHub and Jenkins calls.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    pub fn record(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }

    /// Every call so far, including failed ones, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("injected failure: {0}")]
pub struct FakeError(pub String);

/// GitHub interpreter that records calls and answers from canned data.
#[derive(Debug, Clone)]
pub struct RecordingGitHub {
    log: CallLog,
    commits: HashMap<PrNumber, Vec<Sha>>,
    hooks: HashMap<RepoName, Vec<HookData>>,
    failing_statuses: HashSet<Sha>,
    failing_hooks: HashSet<RepoName>,
    fail_commit_listing: bool,
}

impl RecordingGitHub {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            commits: HashMap::new(),
            hooks: HashMap::new(),
            failing_statuses: HashSet::new(),
            failing_hooks: HashSet::new(),
            fail_commit_listing: false,
        }
    }

    pub fn with_commits(mut self, pr: PrNumber, shas: Vec<Sha>) -> Self {
        self.commits.insert(pr, shas);
        self
    }

    pub fn with_hooks(mut self, repo: RepoName, hooks: Vec<HookData>) -> Self {
        self.hooks.insert(repo, hooks);
        self
    }

    /// Status updates for `sha` fail.
    pub fn failing_status_for(mut self, sha: Sha) -> Self {
        self.failing_statuses.insert(sha);
        self
    }

    /// Hook listing for `repo` fails.
    pub fn failing_hooks_for(mut self, repo: RepoName) -> Self {
        self.failing_hooks.insert(repo);
        self
    }

    pub fn failing_commit_listing(mut self) -> Self {
        self.fail_commit_listing = true;
        self
    }
}

impl GitHubInterpreter for RecordingGitHub {
    type Error = FakeError;

    async fn interpret(&self, effect: GitHubEffect) -> Result<GitHubResponse, Self::Error> {
        self.log.record(Call::GitHub(effect.clone()));

        match effect {
            GitHubEffect::ListPullRequestCommits { pr, .. } => {
                if self.fail_commit_listing {
                    return Err(FakeError(format!("listing commits of {}", pr)));
                }
                Ok(GitHubResponse::Commits {
                    shas: self.commits.get(&pr).cloned().unwrap_or_default(),
                })
            }
            GitHubEffect::CreateStatus(update) => {
                if self.failing_statuses.contains(&update.sha) {
                    Err(FakeError(format!("status for {}", update.sha)))
                } else {
                    Ok(GitHubResponse::Ok)
                }
            }
            GitHubEffect::ListHooks { repo } => {
                if self.failing_hooks.contains(&repo) {
                    return Err(FakeError(format!("hooks of {}", repo)));
                }
                Ok(GitHubResponse::Hooks {
                    hooks: self.hooks.get(&repo).cloned().unwrap_or_default(),
                })
            }
            GitHubEffect::CreateHook { .. } => Ok(GitHubResponse::Ok),
        }
    }
}

/// Jenkins interpreter that records calls.
#[derive(Debug, Clone)]
pub struct RecordingJenkins {
    log: CallLog,
    failing: HashSet<Sha>,
}

impl RecordingJenkins {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            failing: HashSet::new(),
        }
    }

    /// Scheduling a build of `sha` fails.
    pub fn failing_for(mut self, sha: Sha) -> Self {
        self.failing.insert(sha);
        self
    }
}

impl JenkinsInterpreter for RecordingJenkins {
    type Error = FakeError;

    async fn interpret(&self, effect: JenkinsEffect) -> Result<JenkinsResponse, Self::Error> {
        self.log.record(Call::Jenkins(effect.clone()));

        match effect {
            JenkinsEffect::ScheduleBuild(request) => {
                if self.failing.contains(&request.sha) {
                    Err(FakeError(format!("scheduling {}", request.sha)))
                } else {
                    Ok(JenkinsResponse::Queued {
                        queue_url: Some(format!("http://jenkins/queue/item/{}/", request.sha)),
                    })
                }
            }
        }
    }
}

// ─── Generators ───────────────────────────────────────────────────────────────

pub fn arb_sha() -> impl Strategy<Value = Sha> {
    "[0-9a-f]{40}".prop_map(Sha::new)
}

pub fn arb_repo_name() -> impl Strategy<Value = RepoName> {
    "[a-z][a-z0-9-]{0,15}/[a-z][a-z0-9._-]{0,15}".prop_map(RepoName::new)
}

pub fn arb_build_phase() -> impl Strategy<Value = BuildPhase> {
    prop_oneof![
        Just(BuildPhase::Started),
        Just(BuildPhase::Completed),
        prop_oneof![Just("QUEUED"), Just("FINALIZED"), Just("PENDING")]
            .prop_map(|s| BuildPhase::Other(s.to_string())),
    ]
}

/// Known statuses plus lowercase unknown values (never equal to a known one).
pub fn arb_build_status() -> impl Strategy<Value = BuildStatus> {
    prop_oneof![
        Just(BuildStatus::Success),
        Just(BuildStatus::Failure),
        Just(BuildStatus::Unstable),
        Just(BuildStatus::Aborted),
        "[a-z]{1,12}".prop_map(BuildStatus::Other),
    ]
}
