//! Error responses for the notification endpoints.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::dispatch::DispatchError;
use crate::jenkins::NormalizeError;
use crate::webhooks::{HandlerError, ParseError, SignatureError};

/// Errors that end a notification request.
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error(transparent)]
    MalformedBuild(#[from] NormalizeError),

    #[error(transparent)]
    MalformedPullRequest(#[from] ParseError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

impl NotificationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            NotificationError::Signature(_) => StatusCode::UNAUTHORIZED,
            NotificationError::MalformedBuild(_) | NotificationError::MalformedPullRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            NotificationError::Dispatch(DispatchError::Handler(handler)) => match handler {
                HandlerError::UnknownRepository(_) => StatusCode::NOT_FOUND,
                HandlerError::Status(_) | HandlerError::MissingField(_) => StatusCode::BAD_REQUEST,
            },
            NotificationError::Dispatch(
                DispatchError::CommitListing { .. } | DispatchError::Incomplete { .. },
            ) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for NotificationError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}
