//! GitHub webhook endpoint.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use tracing::{debug, warn};

use super::AppState;
use super::error::NotificationError;
use crate::effects::{GitHubInterpreter, JenkinsInterpreter};
use crate::webhooks::{EVENT_HEADER, SIGNATURE_HEADER, check_delivery, parse_webhook};

/// `POST /notification/github` handler.
///
/// The signature is checked before the body is parsed.
///
/// # Response
///
/// - 204 No Content: builds scheduled, or the event/action is not acted on
/// - 400 Bad Request: malformed payload
/// - 401 Unauthorized: missing or invalid signature (when a secret is configured)
/// - 404 Not Found: no configuration for the pull request's head repository
/// - 502 Bad Gateway: GitHub or Jenkins failed for at least one commit
pub async fn github_notification_handler<G, J>(
    State(app_state): State<AppState<G, J>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, NotificationError>
where
    G: GitHubInterpreter + Send + Sync + 'static,
    J: JenkinsInterpreter + Send + Sync + 'static,
{
    let signature = header_str(&headers, SIGNATURE_HEADER);
    check_delivery(&body, signature, app_state.webhook_secret()).inspect_err(|e| {
        warn!(error = %e, "Rejected GitHub delivery");
    })?;

    let event_type = header_str(&headers, EVENT_HEADER);
    let Some(event) = parse_webhook(event_type, &body).inspect_err(|e| {
        warn!(error = %e, "Malformed GitHub pull request payload");
    })?
    else {
        debug!(event_type = ?event_type, "Ignoring GitHub event");
        return Ok(StatusCode::NO_CONTENT);
    };

    debug!(
        repo = %event.base_repo,
        pr = %event.pr_number,
        url = %event.html_url,
        action = %event.action,
        "Received GitHub pull request notification"
    );

    app_state
        .dispatcher()
        .handle_pull_request(&event, app_state.repos())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}
