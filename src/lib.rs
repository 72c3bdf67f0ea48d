//! Jenkins Relay - bridges Jenkins build notifications and GitHub pull requests.
//!
//! Jenkins build notifications become GitHub commit statuses; GitHub pull
//! request events schedule parameterized Jenkins builds for the PR's commits.

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod effects;
pub mod github;
pub mod jenkins;
pub mod logging;
pub mod retry;
pub mod server;
pub mod status;
pub mod types;
pub mod webhooks;

#[cfg(test)]
pub mod test_utils;
