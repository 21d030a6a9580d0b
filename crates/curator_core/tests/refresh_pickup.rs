use curator_core::{
    update, AppState, Effect, JobKind, JobReport, Msg, NoticeLevel, Preferences, RefreshStatus,
    ReloadScope,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    curator_logging::initialize_for_tests();
}

fn running(current: u32) -> RefreshStatus {
    RefreshStatus {
        running: true,
        total: 4,
        current,
        current_show: Some("Severance".to_string()),
        completed: Vec::new(),
        errors: Vec::new(),
    }
}

fn done() -> RefreshStatus {
    RefreshStatus {
        running: false,
        total: 4,
        current: 4,
        current_show: None,
        completed: vec![
            "Severance".to_string(),
            "Andor".to_string(),
            "Slow Horses".to_string(),
            "Shogun".to_string(),
        ],
        errors: Vec::new(),
    }
}

fn is_completion(effect: &Effect) -> bool {
    matches!(effect, Effect::Notify(n) if n.level == NoticeLevel::Success)
}

#[test]
fn ambient_running_job_is_attached_exactly_once() {
    init_logging();
    let (state, effects) = update(
        AppState::new(),
        Msg::StatusRead(JobReport::RefreshAll(running(1))),
    );
    assert_eq!(effects, vec![Effect::StartPolling(JobKind::RefreshAll)]);
    assert!(state.view().refresh.running);
    assert_eq!(state.view().refresh.current, 1);

    let (state, effects) = update(state, Msg::StatusRead(JobReport::RefreshAll(running(2))));
    assert!(effects.is_empty());
    assert_eq!(state.view().refresh.current, 2);

    // Poller ticks never start another poller either.
    let (_state, effects) = update(state, Msg::JobPolled(JobReport::RefreshAll(running(3))));
    assert!(effects.is_empty());
}

#[test]
fn app_start_reads_every_job_status() {
    init_logging();
    let (_state, effects) = update(
        AppState::new(),
        Msg::AppStarted {
            preferences: Preferences::default(),
        },
    );
    for kind in JobKind::ALL {
        assert!(effects.contains(&Effect::ReadStatus(kind)), "missing read for {kind:?}");
    }
}

#[test]
fn refresh_trigger_polls_and_reports_once() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::RefreshAllClicked);
    assert_eq!(effects, vec![Effect::TriggerRefreshAll]);
    assert!(!state.view().refresh.can_start);

    let (state, effects) = update(
        state,
        Msg::JobTriggered {
            kind: JobKind::RefreshAll,
            result: Ok(()),
        },
    );
    assert_eq!(effects, vec![Effect::StartPolling(JobKind::RefreshAll)]);

    let (state, _) = update(state, Msg::JobPolled(JobReport::RefreshAll(running(2))));
    let (state, effects) = update(state, Msg::JobFinished(JobReport::RefreshAll(done())));

    assert_eq!(effects.iter().filter(|e| is_completion(e)).count(), 1);
    assert!(effects.contains(&Effect::Reload(ReloadScope::Shows)));
    assert!(
        !effects.iter().any(|e| matches!(e, Effect::ReadStatus(_))),
        "completion must not re-read status"
    );
    let report = state.view().refresh.report.expect("results panel");
    assert_eq!(report.completed.len(), 4);

    // Re-querying the now idle job in the same session does not re-fire.
    let (state, effects) = update(state, Msg::StatusRead(JobReport::RefreshAll(done())));
    assert!(effects.is_empty());

    // Neither does a fresh session after a reload.
    let (reloaded, effects) = update(
        AppState::new(),
        Msg::AppStarted {
            preferences: state.preferences().clone(),
        },
    );
    assert!(!effects.iter().any(is_completion));
    let (reloaded, effects) = update(reloaded, Msg::StatusRead(JobReport::RefreshAll(done())));
    assert!(effects.is_empty());
    assert!(reloaded.view().refresh.report.is_none());
}

#[test]
fn completion_without_observer_is_silent() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::JobFinished(JobReport::RefreshAll(done())));
    assert!(effects.is_empty());
    assert!(state.view().refresh.report.is_none());
}

#[test]
fn ambient_pickup_reports_completion() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::StatusRead(JobReport::RefreshAll(running(1))));
    let (state, effects) = update(state, Msg::JobFinished(JobReport::RefreshAll(done())));
    assert_eq!(effects.iter().filter(|e| is_completion(e)).count(), 1);

    let (state, _) = update(state, Msg::RefreshReportDismissed);
    assert!(state.view().refresh.report.is_none());
}

#[test]
fn refresh_errors_downgrade_notice() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::StatusRead(JobReport::RefreshAll(running(1))));
    let mut status = done();
    status.errors = vec!["Andor: provider timeout".to_string()];
    let (_state, effects) = update(state, Msg::JobFinished(JobReport::RefreshAll(status)));

    assert!(effects
        .iter()
        .any(|e| matches!(e, Effect::Notify(n) if n.level == NoticeLevel::Warning)));
}

#[test]
fn repeated_poll_failures_surface_once_and_recover() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::StatusRead(JobReport::RefreshAll(running(1))));
    let failing = Msg::PollFailing {
        kind: JobKind::RefreshAll,
        attempts: 5,
        message: "network error".to_string(),
    };
    let (state, effects) = update(state, failing.clone());
    assert_eq!(effects.len(), 1);
    assert!(state.view().refresh.degraded);

    let (state, effects) = update(state, failing);
    assert!(effects.is_empty());

    let (state, effects) = update(
        state,
        Msg::PollRecovered {
            kind: JobKind::RefreshAll,
        },
    );
    assert!(matches!(&effects[0], Effect::Notify(n) if n.level == NoticeLevel::Info));
    assert!(!state.view().refresh.degraded);
}
