//! Pull request webhook registration.
//!
//! For each configured repository, makes sure a hook delivering
//! `pull_request` events to this service's GitHub notification route exists.
//! An existing hook pointing at the same URL is left alone.

use tracing::{info, warn};

use crate::config::RepoConfigs;
use crate::effects::{GitHubEffect, GitHubInterpreter, GitHubResponse, WebhookSecret};
use crate::server::GITHUB_NOTIFICATION_PATH;
use crate::types::RepoName;

/// Event types the installed hook subscribes to.
pub const HOOK_EVENTS: &[&str] = &["pull_request"];

/// What happened for one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookOutcome {
    Created,
    AlreadyRegistered { hook_id: u64 },
    Failed(String),
}

/// Per-repository outcomes, in repository order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HookRegistrationReport {
    pub outcomes: Vec<(RepoName, HookOutcome)>,
}

impl HookRegistrationReport {
    pub fn failures(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| matches!(outcome, HookOutcome::Failed(_)))
            .count()
    }
}

/// The URL GitHub should deliver pull request events to.
pub fn hook_url(public_url: &str) -> String {
    format!("{}{}", public_url.trim_end_matches('/'), GITHUB_NOTIFICATION_PATH)
}

/// Registers the pull request hook on every configured repository.
///
/// A failure for one repository does not stop the others.
pub async fn register_hooks<G: GitHubInterpreter>(
    github: &G,
    repos: &RepoConfigs,
    public_url: &str,
    secret: Option<&str>,
) -> HookRegistrationReport {
    let url = hook_url(public_url);
    let mut report = HookRegistrationReport::default();

    for config in repos.iter() {
        let repo = config.github_repo.clone();
        let outcome = register_one(github, &repo, &url, secret).await;
        match &outcome {
            HookOutcome::Created => info!(repo = %repo, url = %url, "Registered webhook"),
            HookOutcome::AlreadyRegistered { hook_id } => {
                info!(repo = %repo, hook_id, "Webhook already registered")
            }
            HookOutcome::Failed(error) => {
                warn!(repo = %repo, error = %error, "Failed to register webhook")
            }
        }
        report.outcomes.push((repo, outcome));
    }

    report
}

async fn register_one<G: GitHubInterpreter>(
    github: &G,
    repo: &RepoName,
    url: &str,
    secret: Option<&str>,
) -> HookOutcome {
    let existing = match github
        .interpret(GitHubEffect::ListHooks { repo: repo.clone() })
        .await
    {
        Ok(GitHubResponse::Hooks { hooks }) => hooks,
        Ok(other) => return HookOutcome::Failed(format!("unexpected response: {:?}", other)),
        Err(e) => return HookOutcome::Failed(e.to_string()),
    };

    if let Some(hook) = existing.iter().find(|h| h.url.as_deref() == Some(url)) {
        return HookOutcome::AlreadyRegistered { hook_id: hook.id };
    }

    let effect = GitHubEffect::CreateHook {
        repo: repo.clone(),
        url: url.to_string(),
        events: HOOK_EVENTS.iter().map(|e| e.to_string()).collect(),
        secret: secret.map(|s| WebhookSecret(s.to_string())),
    };

    match github.interpret(effect).await {
        Ok(_) => HookOutcome::Created,
        Err(e) => HookOutcome::Failed(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RepoConfig;
    use crate::effects::HookData;
    use crate::test_utils::{Call, CallLog, RecordingGitHub};

    fn repos() -> RepoConfigs {
        RepoConfigs::new([
            RepoConfig::new(RepoName::new("litl/leeroy"), "leeroy"),
            RepoConfig::new(RepoName::new("octocat/hello"), "hello"),
        ])
        .unwrap()
    }

    #[test]
    fn hook_url_joins_route() {
        assert_eq!(
            hook_url("https://relay.example.com/"),
            "https://relay.example.com/notification/github"
        );
    }

    #[tokio::test]
    async fn creates_missing_and_skips_existing_hooks() {
        let log = CallLog::default();
        let github = RecordingGitHub::new(log.clone()).with_hooks(
            RepoName::new("litl/leeroy"),
            vec![HookData {
                id: 42,
                url: Some("https://relay/notification/github".into()),
                events: vec!["pull_request".into()],
                active: true,
            }],
        );

        let report = register_hooks(&github, &repos(), "https://relay", Some("s3cret")).await;

        assert_eq!(
            report.outcomes,
            vec![
                (
                    RepoName::new("litl/leeroy"),
                    HookOutcome::AlreadyRegistered { hook_id: 42 }
                ),
                (RepoName::new("octocat/hello"), HookOutcome::Created),
            ]
        );
        assert_eq!(report.failures(), 0);

        let created: Vec<_> = log
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::GitHub(GitHubEffect::CreateHook { repo, url, secret, .. }) => {
                    Some((repo, url, secret))
                }
                _ => None,
            })
            .collect();
        assert_eq!(
            created,
            vec![(
                RepoName::new("octocat/hello"),
                "https://relay/notification/github".to_string(),
                Some(WebhookSecret("s3cret".into()))
            )]
        );
    }

    #[tokio::test]
    async fn failure_on_one_repo_does_not_stop_others() {
        let log = CallLog::default();
        let github = RecordingGitHub::new(log.clone()).failing_hooks_for(RepoName::new("litl/leeroy"));

        let report = register_hooks(&github, &repos(), "https://relay", None).await;

        assert_eq!(report.failures(), 1);
        assert_eq!(report.outcomes[1], (RepoName::new("octocat/hello"), HookOutcome::Created));
    }
}
