//! Effect interpreter traits.
//!
//! The production implementations live in `crate::github` (octocrab) and
//! `crate::jenkins` (reqwest). Tests use the recording fakes in
//! `crate::test_utils`.

use std::fmt::Display;
use std::future::Future;

use super::github::{GitHubEffect, GitHubResponse};
use super::jenkins::{JenkinsEffect, JenkinsResponse};

/// Interprets GitHub effects against the GitHub API.
///
/// # Example (mock for testing)
///
/// ```ignore
/// struct AlwaysOk;
///
/// impl GitHubInterpreter for AlwaysOk {
///     type Error = std::convert::Infallible;
///
///     async fn interpret(&self, _effect: GitHubEffect) -> Result<GitHubResponse, Self::Error> {
///         Ok(GitHubResponse::Ok)
///     }
/// }
/// ```
pub trait GitHubInterpreter {
    /// The error type returned by this interpreter.
    type Error: Display + Send;

    /// Execute a GitHub effect and return its response.
    fn interpret(
        &self,
        effect: GitHubEffect,
    ) -> impl Future<Output = Result<GitHubResponse, Self::Error>> + Send;
}

/// Interprets Jenkins effects against a Jenkins server.
pub trait JenkinsInterpreter {
    /// The error type returned by this interpreter.
    type Error: Display + Send;

    /// Execute a Jenkins effect and return its response.
    fn interpret(
        &self,
        effect: JenkinsEffect,
    ) -> impl Future<Output = Result<JenkinsResponse, Self::Error>> + Send;
}
