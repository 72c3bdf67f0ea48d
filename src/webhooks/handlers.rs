//! Pure handlers for inbound notifications.
//!
//! Handlers map a parsed notification plus the repository configuration to
//! the collaborator calls it requires, without performing any I/O. The
//! dispatcher executes the returned effects.
//!
//! | Notification | Handler |
//! |--------------|---------|
//! | Jenkins build lifecycle | [`handle_build_event`] - one commit status |
//! | GitHub `pull_request` | [`handle_pull_request`] - pending status and build per commit |

mod build;
mod pull_request;

use thiserror::Error;

use crate::config::UnknownRepository;
use crate::effects::Effect;
use crate::status::StatusMapError;

pub use build::handle_build_event;
pub use pull_request::{BuildPlan, PullRequestDecision, handle_pull_request};

/// Errors that can occur during event handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    /// The event refers to a repository without configuration.
    #[error(transparent)]
    UnknownRepository(#[from] UnknownRepository),

    /// A completed build's status could not be mapped.
    #[error(transparent)]
    Status(#[from] StatusMapError),

    /// A field required to act on the event is absent.
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

/// Result of handling an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerResult {
    /// Nothing to do; not an error.
    Ignored { reason: String },

    /// Effects to execute, in order.
    Effects(Vec<Effect>),
}

impl HandlerResult {
    pub fn ignored(reason: impl Into<String>) -> Self {
        HandlerResult::Ignored {
            reason: reason.into(),
        }
    }

    pub fn with_effects(effects: Vec<Effect>) -> Self {
        HandlerResult::Effects(effects)
    }

    /// The effects to execute; empty when ignored.
    pub fn effects(&self) -> &[Effect] {
        match self {
            HandlerResult::Ignored { .. } => &[],
            HandlerResult::Effects(effects) => effects,
        }
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self, HandlerResult::Ignored { .. })
    }
}
