//! HTTP server for the relay.
//!
//! # Endpoints
//!
//! - `GET /ping` - liveness check, answers `pong`
//! - `POST /notification/jenkins` - Jenkins build notifications; posts a commit status
//! - `POST /notification/github` - GitHub pull request webhooks; schedules builds
//!
//! Both notification endpoints process the request before answering; there
//! is no queue between the HTTP request and the collaborator calls.

use std::sync::Arc;

use axum::routing::{get, post};

use crate::config::RepoConfigs;
use crate::dispatch::Dispatcher;
use crate::effects::{GitHubInterpreter, JenkinsInterpreter};

pub mod error;
pub mod github;
pub mod health;
pub mod jenkins;

pub use error::NotificationError;
pub use github::github_notification_handler;
pub use health::ping_handler;
pub use jenkins::jenkins_notification_handler;

pub const PING_PATH: &str = "/ping";
pub const JENKINS_NOTIFICATION_PATH: &str = "/notification/jenkins";
pub const GITHUB_NOTIFICATION_PATH: &str = "/notification/github";

/// Every route the server answers, as `(method, path)`.
pub const ROUTES: &[(&str, &str)] = &[
    ("GET", PING_PATH),
    ("POST", JENKINS_NOTIFICATION_PATH),
    ("POST", GITHUB_NOTIFICATION_PATH),
];

/// Shared application state.
///
/// Passed to all handlers via Axum's `State` extractor. Cloning is cheap.
pub struct AppState<G, J> {
    inner: Arc<AppStateInner<G, J>>,
}

struct AppStateInner<G, J> {
    repos: RepoConfigs,
    dispatcher: Dispatcher<G, J>,

    /// Secret for verifying GitHub deliveries; `None` accepts unsigned ones.
    webhook_secret: Option<String>,
}

// Manual impl: deriving would require `G: Clone` and `J: Clone`.
impl<G, J> Clone for AppState<G, J> {
    fn clone(&self) -> Self {
        AppState {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<G, J> AppState<G, J>
where
    G: GitHubInterpreter + Sync,
    J: JenkinsInterpreter + Sync,
{
    pub fn new(
        repos: RepoConfigs,
        dispatcher: Dispatcher<G, J>,
        webhook_secret: Option<String>,
    ) -> Self {
        AppState {
            inner: Arc::new(AppStateInner {
                repos,
                dispatcher,
                webhook_secret,
            }),
        }
    }

    pub fn repos(&self) -> &RepoConfigs {
        &self.inner.repos
    }

    pub fn dispatcher(&self) -> &Dispatcher<G, J> {
        &self.inner.dispatcher
    }

    pub fn webhook_secret(&self) -> Option<&str> {
        self.inner.webhook_secret.as_deref()
    }
}

/// Builds the axum Router with all endpoints.
pub fn build_router<G, J>(app_state: AppState<G, J>) -> axum::Router
where
    G: GitHubInterpreter + Send + Sync + 'static,
    J: JenkinsInterpreter + Send + Sync + 'static,
{
    axum::Router::new()
        .route(PING_PATH, get(ping_handler))
        .route(
            JENKINS_NOTIFICATION_PATH,
            post(jenkins_notification_handler::<G, J>),
        )
        .route(
            GITHUB_NOTIFICATION_PATH,
            post(github_notification_handler::<G, J>),
        )
        .with_state(app_state)
}
