//! Jenkins build notification endpoint.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use tracing::{debug, warn};

use super::AppState;
use super::error::NotificationError;
use crate::effects::{GitHubInterpreter, JenkinsInterpreter};
use crate::jenkins::normalize;

/// `POST /notification/jenkins` handler.
///
/// # Response
///
/// - 204 No Content: status posted, or the phase is not acted on
/// - 400 Bad Request: malformed notification or unrecognized build status
/// - 404 Not Found: no configuration for the build's base repository
/// - 502 Bad Gateway: GitHub rejected the status update
pub async fn jenkins_notification_handler<G, J>(
    State(app_state): State<AppState<G, J>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, NotificationError>
where
    G: GitHubInterpreter + Send + Sync + 'static,
    J: JenkinsInterpreter + Send + Sync + 'static,
{
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());

    let event = normalize(&body, content_type).inspect_err(|e| {
        warn!(error = %e, content_type = ?content_type, "Malformed Jenkins notification");
    })?;

    debug!(
        job = %event.job_name,
        number = %event.number,
        phase = %event.phase,
        status = ?event.status,
        "Received Jenkins build notification"
    );

    app_state
        .dispatcher()
        .handle_build_event(&event, app_state.repos())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
