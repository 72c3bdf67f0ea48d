//! GitHub effect interpreter using octocrab.
//!
//! All calls go through octocrab's generic `get`/`post` against the REST
//! routes, wrapped in [`retry_with_backoff`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::effects::{
    CommitStatusUpdate, GitHubEffect, GitHubInterpreter, GitHubResponse, HookData, WebhookSecret,
};
use crate::retry::retry_with_backoff;
use crate::types::{PrNumber, RepoName, Sha};

use super::client::OctocrabClient;
use super::error::GitHubApiError;

/// Page size for list endpoints (GitHub's maximum).
const PER_PAGE: usize = 100;

/// GitHub stops listing pull request commits after this many.
const MAX_PR_COMMITS: usize = 250;

// ─── Wire Types ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct CommitItem {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct HookItem {
    id: u64,
    #[serde(default)]
    active: bool,
    #[serde(default)]
    events: Vec<String>,
    #[serde(default)]
    config: HookItemConfig,
}

#[derive(Debug, Default, Deserialize)]
struct HookItemConfig {
    url: Option<String>,
}

#[derive(Debug, Serialize)]
struct StatusBody<'a> {
    state: &'a str,
    description: &'a str,
    context: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    target_url: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct PageParams {
    per_page: usize,
    page: usize,
}

#[derive(Debug, Serialize)]
struct CreateHookBody<'a> {
    name: &'static str,
    active: bool,
    events: &'a [String],
    config: CreateHookConfig<'a>,
}

#[derive(Debug, Serialize)]
struct CreateHookConfig<'a> {
    url: &'a str,
    content_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    secret: Option<&'a str>,
}

// ─── Interpreter Implementation ───────────────────────────────────────────────

impl GitHubInterpreter for OctocrabClient {
    type Error = GitHubApiError;

    async fn interpret(&self, effect: GitHubEffect) -> Result<GitHubResponse, Self::Error> {
        interpret_github_effect(self, effect).await
    }
}

/// Executes a GitHub effect against the API, retrying transient failures
/// with the client's backoff settings.
pub async fn interpret_github_effect(
    client: &OctocrabClient,
    effect: GitHubEffect,
) -> Result<GitHubResponse, GitHubApiError> {
    retry_with_backoff(client.retry_config(), || execute_effect(client, effect.clone())).await
}

/// Executes a single effect without retry logic.
async fn execute_effect(
    client: &OctocrabClient,
    effect: GitHubEffect,
) -> Result<GitHubResponse, GitHubApiError> {
    match effect {
        GitHubEffect::ListPullRequestCommits { repo, pr } => {
            list_pull_request_commits(client, &repo, pr).await
        }
        GitHubEffect::CreateStatus(update) => create_status(client, &update).await,
        GitHubEffect::ListHooks { repo } => list_hooks(client, &repo).await,
        GitHubEffect::CreateHook {
            repo,
            url,
            events,
            secret,
        } => create_hook(client, &repo, &url, &events, secret.as_ref()).await,
    }
}

// ─── Pull Requests ────────────────────────────────────────────────────────────

async fn list_pull_request_commits(
    client: &OctocrabClient,
    repo: &RepoName,
    pr: PrNumber,
) -> Result<GitHubResponse, GitHubApiError> {
    let route = format!("/repos/{}/pulls/{}/commits", repo, pr.0);
    let mut shas = Vec::new();
    let mut page = 1;

    loop {
        let params = PageParams {
            per_page: PER_PAGE,
            page,
        };
        let items: Vec<CommitItem> = client
            .inner()
            .get(&route, Some(&params))
            .await
            .map_err(GitHubApiError::from_octocrab)?;

        let is_last_page = items.len() < PER_PAGE;
        shas.extend(items.into_iter().map(|item| Sha::new(item.sha)));

        if is_last_page || shas.len() >= MAX_PR_COMMITS {
            break;
        }
        page += 1;
    }

    debug!(repo = %repo, pr = %pr, count = shas.len(), "Listed pull request commits");
    Ok(GitHubResponse::Commits { shas })
}

// ─── Statuses ─────────────────────────────────────────────────────────────────

async fn create_status(
    client: &OctocrabClient,
    update: &CommitStatusUpdate,
) -> Result<GitHubResponse, GitHubApiError> {
    let route = format!("/repos/{}/statuses/{}", update.repo, update.sha);
    let body = StatusBody {
        state: update.state.as_api_str(),
        description: &update.description,
        context: &update.context,
        target_url: update.target_url.as_deref(),
    };

    let _: serde_json::Value = client
        .inner()
        .post(&route, Some(&body))
        .await
        .map_err(GitHubApiError::from_octocrab)?;

    Ok(GitHubResponse::Ok)
}

// ─── Hooks ────────────────────────────────────────────────────────────────────

async fn list_hooks(
    client: &OctocrabClient,
    repo: &RepoName,
) -> Result<GitHubResponse, GitHubApiError> {
    let route = format!("/repos/{}/hooks", repo);
    let mut hooks = Vec::new();
    let mut page = 1;

    loop {
        let params = PageParams {
            per_page: PER_PAGE,
            page,
        };
        let items: Vec<HookItem> = client
            .inner()
            .get(&route, Some(&params))
            .await
            .map_err(GitHubApiError::from_octocrab)?;

        let is_last_page = items.len() < PER_PAGE;
        hooks.extend(items.into_iter().map(|item| HookData {
            id: item.id,
            url: item.config.url,
            events: item.events,
            active: item.active,
        }));

        if is_last_page {
            break;
        }
        page += 1;
    }

    Ok(GitHubResponse::Hooks { hooks })
}

async fn create_hook(
    client: &OctocrabClient,
    repo: &RepoName,
    url: &str,
    events: &[String],
    secret: Option<&WebhookSecret>,
) -> Result<GitHubResponse, GitHubApiError> {
    let route = format!("/repos/{}/hooks", repo);
    let body = CreateHookBody {
        name: "web",
        active: true,
        events,
        config: CreateHookConfig {
            url,
            content_type: "json",
            secret: secret.map(|s| s.0.as_str()),
        },
    };

    let _: serde_json::Value = client
        .inner()
        .post(&route, Some(&body))
        .await
        .map_err(GitHubApiError::from_octocrab)?;

    Ok(GitHubResponse::Ok)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::CommitState;
    use serde_json::json;

    #[test]
    fn status_body_omits_missing_target_url() {
        let body = StatusBody {
            state: CommitState::Pending.as_api_str(),
            description: "Jenkins build is being scheduled",
            context: "jenkins",
            target_url: None,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "state": "pending",
                "description": "Jenkins build is being scheduled",
                "context": "jenkins"
            })
        );
    }

    #[test]
    fn hook_body_shape() {
        let events = vec!["pull_request".to_string()];
        let body = CreateHookBody {
            name: "web",
            active: true,
            events: &events,
            config: CreateHookConfig {
                url: "https://relay/notification/github",
                content_type: "json",
                secret: Some("s3cret"),
            },
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "name": "web",
                "active": true,
                "events": ["pull_request"],
                "config": {
                    "url": "https://relay/notification/github",
                    "content_type": "json",
                    "secret": "s3cret"
                }
            })
        );
    }

    #[test]
    fn hook_items_tolerate_missing_config() {
        let items: Vec<HookItem> = serde_json::from_value(json!([
            { "id": 1, "active": true, "events": ["push"], "config": { "url": "http://a" } },
            { "id": 2 }
        ]))
        .unwrap();
        assert_eq!(items[0].config.url.as_deref(), Some("http://a"));
        assert!(items[1].config.url.is_none());
        assert!(!items[1].active);
    }
}
