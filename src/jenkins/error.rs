//! Jenkins API error types.

use std::fmt;

use thiserror::Error;

use crate::retry::{Classified, ErrorKind};

/// A Jenkins API error with categorization for retry decisions.
#[derive(Debug, Error)]
pub struct JenkinsError {
    pub kind: ErrorKind,

    /// The HTTP status code, if a response was received.
    pub status_code: Option<u16>,

    pub message: String,

    #[source]
    pub source: Option<reqwest::Error>,
}

impl fmt::Display for JenkinsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "Jenkins API error (HTTP {}): {}", code, self.message),
            None => write!(f, "Jenkins API error: {}", self.message),
        }
    }
}

impl JenkinsError {
    /// Categorizes a transport-level failure.
    ///
    /// Timeouts and connection failures are transient; anything else without
    /// an HTTP status is permanent.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        let status_code = err.status().map(|s| s.as_u16());
        let kind = match status_code {
            Some(code) => kind_for_status(code),
            None if err.is_timeout() || err.is_connect() => ErrorKind::Transient,
            None => ErrorKind::Permanent,
        };

        Self {
            kind,
            status_code,
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Categorizes a non-success HTTP response.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = match body.trim() {
            "" => "empty response body".to_string(),
            text => truncate(text, 200),
        };

        Self {
            kind: kind_for_status(status),
            status_code: Some(status),
            message,
            source: None,
        }
    }

    /// Creates a permanent error without a source.
    pub fn permanent(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Permanent,
            status_code: None,
            message: message.into(),
            source: None,
        }
    }
}

impl Classified for JenkinsError {
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

fn kind_for_status(status: u16) -> ErrorKind {
    match status {
        408 | 429 => ErrorKind::Transient,
        500..=599 => ErrorKind::Transient,
        _ => ErrorKind::Permanent,
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert_eq!(JenkinsError::from_status(503, "").kind, ErrorKind::Transient);
        assert_eq!(JenkinsError::from_status(429, "slow down").kind, ErrorKind::Transient);
        assert_eq!(JenkinsError::from_status(404, "no such job").kind, ErrorKind::Permanent);
        assert_eq!(JenkinsError::from_status(401, "").kind, ErrorKind::Permanent);
        assert_eq!(JenkinsError::from_status(400, "").kind, ErrorKind::Permanent);
    }

    #[test]
    fn display_includes_status_and_message() {
        let err = JenkinsError::from_status(404, "  no such job  ");
        assert_eq!(err.to_string(), "Jenkins API error (HTTP 404): no such job");

        let err = JenkinsError::from_status(500, "");
        assert_eq!(err.to_string(), "Jenkins API error (HTTP 500): empty response body");

        let err = JenkinsError::permanent("bad url");
        assert_eq!(err.to_string(), "Jenkins API error: bad url");
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(1000);
        let err = JenkinsError::from_status(500, &body);
        assert_eq!(err.message.len(), 203);
        assert!(err.message.ends_with("..."));
    }
}
