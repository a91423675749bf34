mod support;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use review_core::{EditMode, EditTarget};
use review_engine::{
    CredentialConfig, EngineEvent, EngineHandle, PollSettings, Provider, TaskError, TaskStatus,
};

use support::{outcome, snapshot, success, with_progress, ScriptedApi};

const WAIT: Duration = Duration::from_secs(5);

fn credentials() -> CredentialConfig {
    CredentialConfig {
        selected: None,
        keys: BTreeMap::from([(Provider::Anthropic, "a-key".to_string())]),
    }
}

fn fast_polls() -> PollSettings {
    PollSettings {
        interval: Duration::from_millis(5),
        max_attempts: 50,
    }
}

fn next_event(engine: &EngineHandle) -> EngineEvent {
    engine.recv_timeout(WAIT).expect("engine event")
}

#[test]
fn submission_flows_through_progress_to_completion() {
    let api = Arc::new(ScriptedApi::new(vec![
        Ok(with_progress(snapshot("t-1", TaskStatus::Started), 1, 2)),
        Ok(success("t-1")),
    ]));
    let engine = EngineHandle::with_api(api.clone(), credentials(), fast_polls());

    engine.submit(7, EditMode::Copyedit, EditTarget::section("Cats", "History"));

    match next_event(&engine) {
        EngineEvent::TaskAccepted {
            submission,
            task_id,
        } => {
            assert_eq!(submission, 7);
            assert_eq!(task_id, "t-1");
        }
        other => panic!("unexpected event {other:?}"),
    }
    match next_event(&engine) {
        EngineEvent::Progress { task_id, progress } => {
            assert_eq!(task_id, "t-1");
            assert_eq!(progress.progress_percentage, 50);
        }
        other => panic!("unexpected event {other:?}"),
    }
    match next_event(&engine) {
        EngineEvent::Completed { task_id, result } => {
            assert_eq!(task_id, "t-1");
            assert_eq!(result, Ok(outcome()));
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(api.status_calls(), 2);
}

#[test]
fn submission_errors_are_reported_with_their_id() {
    let api = Arc::new(ScriptedApi::new(Vec::new()));
    let engine = EngineHandle::with_api(api, CredentialConfig::default(), fast_polls());

    engine.submit(3, EditMode::Brevity, EditTarget::content("text"));

    match next_event(&engine) {
        EngineEvent::SubmissionFailed { submission, error } => {
            assert_eq!(submission, 3);
            assert!(matches!(error, TaskError::Auth(_)));
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn updated_credentials_apply_to_later_submissions() {
    let api = Arc::new(ScriptedApi::new(vec![Ok(success("t-1"))]));
    let engine = EngineHandle::with_api(api, CredentialConfig::default(), fast_polls());

    engine.set_credentials(credentials());
    engine.submit(1, EditMode::Copyedit, EditTarget::content("text"));

    assert!(matches!(
        next_event(&engine),
        EngineEvent::TaskAccepted { submission: 1, .. }
    ));
}

#[test]
fn cancelled_poll_stops_and_reports_nothing() {
    let api = Arc::new(ScriptedApi::new(Vec::new()));
    let engine = EngineHandle::with_api(api.clone(), credentials(), fast_polls());

    engine.submit(1, EditMode::Copyedit, EditTarget::content("text"));
    let task_id = match next_event(&engine) {
        EngineEvent::TaskAccepted { task_id, .. } => task_id,
        other => panic!("unexpected event {other:?}"),
    };
    engine.cancel_polling(task_id);

    // Let any request that was already in flight settle.
    std::thread::sleep(Duration::from_millis(50));
    let calls = api.status_calls();
    let deadline = Instant::now() + Duration::from_millis(200);
    while Instant::now() < deadline {
        assert!(engine.try_recv().is_none());
        std::thread::sleep(Duration::from_millis(10));
    }
    assert_eq!(api.status_calls(), calls);
    assert!(calls < fast_polls().max_attempts);
}
