//! Jenkins remote API client.
//!
//! Builds are scheduled with `POST {url}/job/{job}/buildWithParameters`,
//! parameters in the query string. A job inside a folder is configured as
//! `folder/job` and addressed as `/job/folder/job/job`. Jenkins answers
//! `201 Created` with the queue item in the `Location` header.

use std::time::Duration;

use reqwest::Url;
use reqwest::header::LOCATION;
use tracing::{debug, info};

use crate::config::JenkinsConfig;
use crate::effects::{BuildScheduleRequest, JenkinsEffect, JenkinsInterpreter, JenkinsResponse};
use crate::retry::{RetryConfig, retry_with_backoff};

use super::error::JenkinsError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A Jenkins API client for one Jenkins server.
#[derive(Clone)]
pub struct JenkinsClient {
    http: reqwest::Client,
    base_url: Url,
    user: Option<String>,
    api_token: Option<String>,
    retry: RetryConfig,
}

impl JenkinsClient {
    pub fn new(config: &JenkinsConfig, retry: RetryConfig) -> Result<Self, JenkinsError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("jenkins-relay/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(JenkinsError::from_reqwest)?;

        let base_url = Url::parse(&config.url).map_err(|e| {
            JenkinsError::permanent(format!("invalid Jenkins URL '{}': {}", config.url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(JenkinsError::permanent(format!(
                "Jenkins URL '{}' cannot have a path",
                config.url
            )));
        }

        Ok(Self {
            http,
            base_url,
            user: config.user.clone(),
            api_token: config.api_token.clone(),
            retry,
        })
    }

    /// URL of the job's `buildWithParameters` endpoint. Job name segments
    /// are percent-encoded.
    pub fn build_url(&self, job_name: &str) -> Result<Url, JenkinsError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                JenkinsError::permanent(format!("Jenkins URL '{}' cannot have a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(job_path(job_name))
            .push("buildWithParameters");
        Ok(url)
    }

    async fn schedule_build(
        &self,
        request: &BuildScheduleRequest,
    ) -> Result<JenkinsResponse, JenkinsError> {
        let url = self.build_url(&request.job_name)?;
        let params = request.build_parameters();

        let mut builder = self.http.post(url).query(&params);
        if let Some(user) = &self.user {
            builder = builder.basic_auth(user, self.api_token.as_deref());
        }

        let response = builder.send().await.map_err(JenkinsError::from_reqwest)?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(JenkinsError::from_status(status.as_u16(), &body));
        }

        let queue_url = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        debug!(job = %request.job_name, sha = %request.sha, ?queue_url, "Jenkins accepted build");
        Ok(JenkinsResponse::Queued { queue_url })
    }
}

impl std::fmt::Debug for JenkinsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JenkinsClient")
            .field("base_url", &self.base_url.as_str())
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

impl JenkinsInterpreter for JenkinsClient {
    type Error = JenkinsError;

    async fn interpret(&self, effect: JenkinsEffect) -> Result<JenkinsResponse, Self::Error> {
        match effect {
            JenkinsEffect::ScheduleBuild(request) => {
                let req = &request;
                let response =
                    retry_with_backoff(self.retry, move || self.schedule_build(req)).await?;

                info!(
                    job = %request.job_name,
                    repo = %request.base_repo,
                    sha = %request.sha,
                    "Scheduled Jenkins build"
                );
                Ok(response)
            }
        }
    }
}

/// Path segments for `folder/sub/job`: `job`, `folder`, `job`, `sub`, `job`, `job`.
pub fn job_path(job_name: &str) -> impl Iterator<Item = &str> {
    job_name
        .split('/')
        .filter(|segment| !segment.is_empty())
        .flat_map(|segment| ["job", segment])
}
