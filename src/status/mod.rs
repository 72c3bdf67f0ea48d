//! Mapping Jenkins build outcomes to GitHub commit statuses.
//!
//! | phase | status | state | description |
//! |-------|--------|-------|-------------|
//! | `STARTED` | any | `pending` | `Jenkins build 'job' #n is running` |
//! | `COMPLETED` | `SUCCESS` | `success` | `... has succeeded` |
//! | `COMPLETED` | `FAILURE` | `failure` | `... has failed` |
//! | `COMPLETED` | `UNSTABLE` | `failure` | `... was unstable` |
//! | `COMPLETED` | `ABORTED` | `error` | `... was aborted` |
//! | `COMPLETED` | other / absent | - | [`StatusMapError`] |
//! | other | - | - | [`StatusMapError::NotActionable`] |

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::jenkins::{BuildPhase, BuildStatus};
use crate::types::BuildNumber;

/// Description posted for every commit of a pull request before its build is
/// handed to Jenkins.
pub const SCHEDULED_DESCRIPTION: &str = "Jenkins build is being scheduled";

/// GitHub rejects longer status descriptions with 422.
pub const MAX_DESCRIPTION_CHARS: usize = 140;

/// State of a GitHub commit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitState {
    Pending,
    Success,
    Failure,
    Error,
}

impl CommitState {
    /// Returns the value GitHub's statuses API expects.
    pub fn as_api_str(&self) -> &'static str {
        match self {
            CommitState::Pending => "pending",
            CommitState::Success => "success",
            CommitState::Failure => "failure",
            CommitState::Error => "error",
        }
    }

    /// Returns true if this is a terminal state (not pending).
    pub fn is_terminal(&self) -> bool {
        !matches!(self, CommitState::Pending)
    }
}

impl fmt::Display for CommitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_api_str())
    }
}

/// The commit status a build event translates to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedStatus {
    pub state: CommitState,
    pub description: String,
}

/// Why a build event has no commit status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatusMapError {
    /// The phase is neither `STARTED` nor `COMPLETED`; such events are ignored.
    #[error("build phase '{0}' is not actionable")]
    NotActionable(String),

    /// A `COMPLETED` build without a status.
    #[error("completed build has no status")]
    MissingStatus,

    /// A `COMPLETED` build whose status is not one Jenkins is known to send.
    #[error("Bad build status: '{0}'")]
    UnrecognizedStatus(String),
}

/// Maps a build's phase and terminal status to a commit status.
///
/// A `STARTED` build is pending whatever its `status` field says.
pub fn map_build_status(
    phase: &BuildPhase,
    status: Option<&BuildStatus>,
    job_name: &str,
    number: BuildNumber,
) -> Result<MappedStatus, StatusMapError> {
    let (state, outcome) = match (phase, status) {
        (BuildPhase::Started, _) => (CommitState::Pending, "is running"),
        (BuildPhase::Completed, Some(BuildStatus::Success)) => {
            (CommitState::Success, "has succeeded")
        }
        (BuildPhase::Completed, Some(BuildStatus::Failure)) => (CommitState::Failure, "has failed"),
        (BuildPhase::Completed, Some(BuildStatus::Unstable)) => {
            (CommitState::Failure, "was unstable")
        }
        (BuildPhase::Completed, Some(BuildStatus::Aborted)) => (CommitState::Error, "was aborted"),
        (BuildPhase::Completed, Some(BuildStatus::Other(raw))) => {
            return Err(StatusMapError::UnrecognizedStatus(raw.clone()));
        }
        (BuildPhase::Completed, None) => return Err(StatusMapError::MissingStatus),
        (BuildPhase::Other(raw), _) => return Err(StatusMapError::NotActionable(raw.clone())),
    };

    Ok(MappedStatus {
        state,
        description: truncate_description(format!(
            "{} {}",
            description_prefix(job_name, number),
            outcome
        )),
    })
}

/// Cuts `description` to [`MAX_DESCRIPTION_CHARS`] characters, ending in `…`
/// when shortened.
pub fn truncate_description(description: String) -> String {
    if description.chars().count() <= MAX_DESCRIPTION_CHARS {
        return description;
    }
    let mut truncated: String = description.chars().take(MAX_DESCRIPTION_CHARS - 1).collect();
    truncated.push('…');
    truncated
}

fn description_prefix(job_name: &str, number: BuildNumber) -> String {
    format!("Jenkins build '{}' #{}", job_name, number.0)
}
