//! GitHub webhook payload parser.
//!
//! # Parsing Strategy
//!
//! 1. The event type is determined from the `X-GitHub-Event` header
//! 2. `pull_request` payloads are parsed into [`PullRequestEvent`]
//! 3. Other event types (including `ping`) return `Ok(None)` (ignored, not error)
//! 4. Malformed payloads return `Err` with details
//!
//! A delivery without the header is assumed to be a pull request event.

use serde::Deserialize;
use thiserror::Error;

use crate::types::{PrNumber, RepoName, Sha};

use super::events::{PrAction, PullRequestEvent};

/// Header naming the webhook event type.
pub const EVENT_HEADER: &str = "x-github-event";

/// Error type for webhook parsing failures.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON deserialization failed (includes missing required fields).
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Field has invalid value.
    #[error("invalid field value for {field}: {value}")]
    InvalidField { field: &'static str, value: String },
}

/// Parses a webhook payload.
///
/// * `Ok(Some(event))` - a pull request event
/// * `Ok(None)` - another event type (ignored)
/// * `Err(e)` - malformed payload or missing required fields
///
/// # Examples
///
/// ```
/// use jenkins_relay::webhooks::parse_webhook;
///
/// assert!(parse_webhook(Some("ping"), br#"{"zen": "Keep it logically awesome."}"#)
///     .unwrap()
///     .is_none());
/// ```
pub fn parse_webhook(
    event_type: Option<&str>,
    payload: &[u8],
) -> Result<Option<PullRequestEvent>, ParseError> {
    match event_type {
        None | Some("pull_request") => parse_pull_request(payload).map(Some),
        Some(_) => Ok(None),
    }
}

#[derive(Debug, Deserialize)]
struct RawPullRequestPayload {
    action: String,
    pull_request: RawPullRequest,
}

#[derive(Debug, Deserialize)]
struct RawPullRequest {
    number: u64,
    html_url: String,
    head: RawRef,
    base: RawRef,
}

#[derive(Debug, Deserialize)]
struct RawRef {
    sha: String,
    /// Null once a fork has been deleted.
    repo: Option<RawRepository>,
}

#[derive(Debug, Deserialize)]
struct RawRepository {
    full_name: String,
}

/// Parses a `pull_request` payload.
pub fn parse_pull_request(payload: &[u8]) -> Result<PullRequestEvent, ParseError> {
    let raw: RawPullRequestPayload = serde_json::from_slice(payload)?;
    let pr = raw.pull_request;

    if pr.head.sha.trim().is_empty() {
        return Err(ParseError::InvalidField {
            field: "pull_request.head.sha",
            value: pr.head.sha,
        });
    }

    let base_repo = pr
        .base
        .repo
        .map(|r| RepoName::new(r.full_name))
        .ok_or(ParseError::InvalidField {
            field: "pull_request.base.repo",
            value: "null".to_string(),
        })?;

    Ok(PullRequestEvent {
        action: PrAction::parse(&raw.action),
        pr_number: PrNumber(pr.number),
        html_url: pr.html_url,
        head_sha: Sha::new(pr.head.sha),
        base_repo,
        head_repo: pr.head.repo.map(|r| RepoName::new(r.full_name)),
    })
}
