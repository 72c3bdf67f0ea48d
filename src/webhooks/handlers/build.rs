//! Handler for Jenkins build lifecycle notifications.

use tracing::{debug, error, warn};

use crate::config::RepoConfigs;
use crate::effects::{CommitStatusUpdate, Effect, GitHubEffect};
use crate::jenkins::BuildEvent;
use crate::jenkins::notification::{PARAM_BASE_REPO, PARAM_SHA};
use crate::status::map_build_status;

use super::{HandlerError, HandlerResult};

/// Handles a normalized build notification.
///
/// Non-actionable phases are ignored. Otherwise the build's base repository
/// is resolved and exactly one commit status is produced for the built
/// commit, linking to the build page.
pub fn handle_build_event(
    event: &BuildEvent,
    repos: &RepoConfigs,
) -> Result<HandlerResult, HandlerError> {
    if !event.phase.is_actionable() {
        debug!(job = %event.job_name, number = %event.number, phase = %event.phase, "Ignoring build phase");
        return Ok(HandlerResult::ignored(format!("build phase {}", event.phase)));
    }

    let base_repo = event
        .base_repo()
        .ok_or(HandlerError::MissingField(PARAM_BASE_REPO))?;
    let sha = event.sha().ok_or(HandlerError::MissingField(PARAM_SHA))?;

    let config = repos.resolve(&base_repo).inspect_err(|e| {
        warn!(repo = %base_repo, job = %event.job_name, "{}", e);
    })?;

    let mapped = map_build_status(
        &event.phase,
        event.status.as_ref(),
        &event.job_name,
        event.number,
    )
    .inspect_err(|e| {
        error!(
            repo = %base_repo,
            job = %event.job_name,
            number = %event.number,
            status = ?event.status,
            "{}", e
        );
    })?;

    debug!(
        repo = %config.github_repo,
        sha = %sha,
        state = %mapped.state,
        "Reporting build status"
    );

    Ok(HandlerResult::with_effects(vec![Effect::GitHub(
        GitHubEffect::CreateStatus(CommitStatusUpdate {
            repo: config.github_repo.clone(),
            sha,
            state: mapped.state,
            description: mapped.description,
            target_url: Some(event.url.clone()),
            context: config.status_context.clone(),
        }),
    )]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RepoConfig, UnknownRepository};
    use crate::jenkins::{BuildPhase, BuildStatus};
    use crate::status::{CommitState, StatusMapError};
    use crate::test_utils::{arb_build_status, arb_sha};
    use crate::types::{BuildNumber, RepoName, Sha};
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    fn repos() -> RepoConfigs {
        RepoConfigs::new([RepoConfig::new(RepoName::new("litl/leeroy"), "leeroy")]).unwrap()
    }

    fn event(phase: BuildPhase, status: Option<BuildStatus>) -> BuildEvent {
        let mut parameters = BTreeMap::new();
        parameters.insert("GIT_BASE_REPO".to_string(), "litl/leeroy".to_string());
        parameters.insert("GIT_SHA1".to_string(), "deadbeef".to_string());
        BuildEvent {
            job_name: "leeroy".into(),
            number: BuildNumber(12),
            url: "http://jenkins/job/leeroy/12/".into(),
            phase,
            status,
            parameters,
        }
    }

    fn single_status(result: HandlerResult) -> CommitStatusUpdate {
        match result.effects() {
            [Effect::GitHub(GitHubEffect::CreateStatus(update))] => update.clone(),
            other => panic!("expected one status effect, got {:?}", other),
        }
    }

    #[test]
    fn started_build_reports_pending() {
        let result = handle_build_event(&event(BuildPhase::Started, None), &repos()).unwrap();
        let update = single_status(result);

        assert_eq!(update.repo, RepoName::new("litl/leeroy"));
        assert_eq!(update.sha, Sha::new("deadbeef"));
        assert_eq!(update.state, CommitState::Pending);
        assert_eq!(update.description, "Jenkins build 'leeroy' #12 is running");
        assert_eq!(update.target_url.as_deref(), Some("http://jenkins/job/leeroy/12/"));
        assert_eq!(update.context, "jenkins");
    }

    #[test]
    fn completed_failure_reports_failure() {
        let result = handle_build_event(
            &event(BuildPhase::Completed, Some(BuildStatus::Failure)),
            &repos(),
        )
        .unwrap();
        let update = single_status(result);
        assert_eq!(update.state, CommitState::Failure);
        assert_eq!(update.description, "Jenkins build 'leeroy' #12 has failed");
    }

    #[test]
    fn other_phases_are_ignored_without_lookup() {
        let mut ev = event(BuildPhase::Other("FINALIZED".into()), Some(BuildStatus::Success));
        ev.parameters.clear();
        let result = handle_build_event(&ev, &RepoConfigs::default()).unwrap();
        assert!(result.is_ignored());
    }

    #[test]
    fn unknown_repo_is_not_found() {
        let mut ev = event(BuildPhase::Started, None);
        ev.parameters.insert("GIT_BASE_REPO".into(), "someone/else".into());
        assert_eq!(
            handle_build_event(&ev, &repos()),
            Err(HandlerError::UnknownRepository(UnknownRepository(RepoName::new(
                "someone/else"
            ))))
        );
    }

    #[test]
    fn unrecognized_status_produces_no_effect() {
        let result = handle_build_event(
            &event(BuildPhase::Completed, Some(BuildStatus::Other("BOGUS".into()))),
            &repos(),
        );
        assert_eq!(
            result,
            Err(HandlerError::Status(StatusMapError::UnrecognizedStatus("BOGUS".into())))
        );
    }

    #[test]
    fn missing_parameters_are_reported() {
        let mut ev = event(BuildPhase::Started, None);
        ev.parameters.remove("GIT_SHA1");
        assert_eq!(
            handle_build_event(&ev, &repos()),
            Err(HandlerError::MissingField("GIT_SHA1"))
        );

        ev.parameters.clear();
        assert_eq!(
            handle_build_event(&ev, &repos()),
            Err(HandlerError::MissingField("GIT_BASE_REPO"))
        );
    }

    #[test]
    fn repo_status_context_is_used() {
        let repos = RepoConfigs::new([RepoConfig {
            status_context: "ci/leeroy".into(),
            ..RepoConfig::new(RepoName::new("litl/leeroy"), "leeroy")
        }])
        .unwrap();
        let update = single_status(handle_build_event(&event(BuildPhase::Started, None), &repos).unwrap());
        assert_eq!(update.context, "ci/leeroy");
    }

    proptest! {
        #[test]
        fn actionable_events_yield_exactly_one_status(
            status in arb_build_status(),
            sha in arb_sha(),
        ) {
            let mut ev = event(BuildPhase::Completed, Some(status.clone()));
            ev.parameters.insert("GIT_SHA1".into(), sha.to_string());

            match (handle_build_event(&ev, &repos()), status) {
                (Err(HandlerError::Status(_)), BuildStatus::Other(_)) => {}
                (Ok(result), _) => {
                    let update = single_status(result);
                    prop_assert_eq!(update.sha, sha);
                }
                (other, status) => prop_assert!(false, "{:?} for {:?}", other, status),
            }
        }
    }
}
