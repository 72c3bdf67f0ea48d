//! GitHub API errors, classified for retry.
//!
//! 5xx, 429, rate-limit 403s and network failures are transient. Every other
//! failure is reported on the first attempt.

use std::fmt;
use thiserror::Error;

use crate::retry::{Classified, ErrorKind};

/// Phrases GitHub uses in 403 bodies when throttling.
const RATE_LIMIT_MARKERS: &[&str] = &["rate limit", "api rate", "abuse detection"];

/// Phrases in transport errors (no HTTP response) worth retrying.
const NETWORK_MARKERS: &[&str] = &["timeout", "timed out", "connection", "network", "dns"];

#[derive(Debug, Error)]
pub struct GitHubApiError {
    pub kind: ErrorKind,

    /// HTTP status of GitHub's response; `None` when no response arrived.
    pub status_code: Option<u16>,

    pub message: String,

    #[source]
    pub source: Option<octocrab::Error>,
}

impl fmt::Display for GitHubApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "GitHub API error (HTTP {}): {}", code, self.message),
            None => write!(f, "GitHub API error: {}", self.message),
        }
    }
}

impl Classified for GitHubApiError {
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl GitHubApiError {
    pub fn from_octocrab(err: octocrab::Error) -> Self {
        let status_code = match &err {
            octocrab::Error::GitHub { source, .. } => Some(source.status_code.as_u16()),
            _ => None,
        };
        let message = err.to_string();

        Self {
            kind: classify(status_code, &message),
            status_code,
            message,
            source: Some(err),
        }
    }
}

fn classify(status_code: Option<u16>, message: &str) -> ErrorKind {
    let message = message.to_lowercase();
    let transient = match status_code {
        Some(429) | Some(500..=599) => true,
        Some(403) => mentions_any(&message, RATE_LIMIT_MARKERS),
        Some(_) => false,
        None => mentions_any(&message, NETWORK_MARKERS),
    };

    if transient || message.contains("try again") {
        ErrorKind::Transient
    } else {
        ErrorKind::Permanent
    }
}

fn mentions_any(message: &str, markers: &[&str]) -> bool {
    markers.iter().any(|marker| message.contains(marker))
}
