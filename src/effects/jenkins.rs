//! Jenkins effect types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::jenkins::notification::{PARAM_BASE_REPO, PARAM_HEAD_REPO, PARAM_REVIEW_URL, PARAM_SHA};
use crate::types::{RepoName, Sha};

/// A request to schedule one parameterized build.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildScheduleRequest {
    /// Job to trigger; `folder/job` addresses a job inside a folder.
    pub job_name: String,

    /// Repository whose configuration governs the build.
    pub base_repo: RepoName,

    /// Repository the commit comes from (differs from `base_repo` for forks).
    pub head_repo: RepoName,

    pub sha: Sha,

    /// Pull request page on GitHub.
    pub review_url: String,

    /// Extra job parameters from the repository configuration.
    pub extra_parameters: BTreeMap<String, String>,
}

impl BuildScheduleRequest {
    /// All parameters sent to Jenkins.
    ///
    /// The four `GIT_*`/`GITHUB_URL` parameters always win over configured
    /// extras of the same name; build notifications depend on them.
    pub fn build_parameters(&self) -> BTreeMap<String, String> {
        let mut params = self.extra_parameters.clone();
        params.insert(PARAM_BASE_REPO.to_string(), self.base_repo.to_string());
        params.insert(PARAM_HEAD_REPO.to_string(), self.head_repo.to_string());
        params.insert(PARAM_SHA.to_string(), self.sha.to_string());
        params.insert(PARAM_REVIEW_URL.to_string(), self.review_url.clone());
        params
    }
}

/// A Jenkins API effect.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JenkinsEffect {
    /// Queue a parameterized build.
    ScheduleBuild(BuildScheduleRequest),
}

/// Response from a Jenkins effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JenkinsResponse {
    /// The build was queued. `queue_url` is the queue item Jenkins reported, if any.
    Queued { queue_url: Option<String> },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> BuildScheduleRequest {
        BuildScheduleRequest {
            job_name: "leeroy".into(),
            base_repo: RepoName::new("litl/leeroy"),
            head_repo: RepoName::new("fork/leeroy"),
            sha: Sha::new("deadbeef"),
            review_url: "https://github.com/litl/leeroy/pull/7".into(),
            extra_parameters: BTreeMap::new(),
        }
    }

    #[test]
    fn build_parameters_carry_provenance() {
        let params = request().build_parameters();
        assert_eq!(params.get("GIT_BASE_REPO").map(String::as_str), Some("litl/leeroy"));
        assert_eq!(params.get("GIT_HEAD_REPO").map(String::as_str), Some("fork/leeroy"));
        assert_eq!(params.get("GIT_SHA1").map(String::as_str), Some("deadbeef"));
        assert_eq!(
            params.get("GITHUB_URL").map(String::as_str),
            Some("https://github.com/litl/leeroy/pull/7")
        );
        assert_eq!(params.len(), 4);
    }

    #[test]
    fn extras_are_added_but_cannot_override_provenance() {
        let mut req = request();
        req.extra_parameters.insert("TARGET".into(), "linux".into());
        req.extra_parameters.insert("GIT_SHA1".into(), "bogus".into());

        let params = req.build_parameters();
        assert_eq!(params.get("TARGET").map(String::as_str), Some("linux"));
        assert_eq!(params.get("GIT_SHA1").map(String::as_str), Some("deadbeef"));
    }
}
