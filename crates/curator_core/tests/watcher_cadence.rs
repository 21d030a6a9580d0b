use curator_core::{
    update, AppState, Effect, Msg, NoticeLevel, Preferences, Prerequisite, Ticker,
    WatcherCommand, WatcherIndicator, WatcherSource, WatcherState, WatcherStatus,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    curator_logging::initialize_for_tests();
}

fn started() -> AppState {
    let (state, _) = update(
        AppState::new(),
        Msg::AppStarted {
            preferences: Preferences::default(),
        },
    );
    state
}

fn status(state: WatcherState, prerequisites_met: bool) -> WatcherStatus {
    WatcherStatus {
        status: state,
        pause_reason: None,
        pending_files: 2,
        queued_files: 1,
        prerequisites: vec![
            Prerequisite {
                name: "Download folder".to_string(),
                met: true,
                detail: "/downloads is readable".to_string(),
            },
            Prerequisite {
                name: "Library root".to_string(),
                met: prerequisites_met,
                detail: "/media/tv".to_string(),
            },
        ],
        all_prerequisites_met: prerequisites_met,
    }
}

fn receive(
    state: AppState,
    source: WatcherSource,
    result: Result<WatcherStatus, String>,
) -> (AppState, Vec<Effect>) {
    update(state, Msg::WatcherStatusReceived { source, result })
}

#[test]
fn app_start_begins_indicator_and_heartbeat() {
    init_logging();
    let (state, effects) = update(
        AppState::new(),
        Msg::AppStarted {
            preferences: Preferences::default(),
        },
    );
    assert!(effects.contains(&Effect::StartTicker(Ticker::WatcherIndicator)));
    assert!(effects.contains(&Effect::FetchWatcherStatus(WatcherSource::Indicator)));
    assert!(effects.contains(&Effect::SendHeartbeat));
    assert!(effects.contains(&Effect::StartTicker(Ticker::Heartbeat)));
    assert!(!effects.contains(&Effect::StartTicker(Ticker::WatcherDetail)));
    assert_eq!(state.view().watcher.indicator, WatcherIndicator::Unknown);

    let (_state, effects) = update(
        state,
        Msg::AppStarted {
            preferences: Preferences::default(),
        },
    );
    assert!(effects.is_empty());
}

#[test]
fn hidden_app_starts_without_heartbeat() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::VisibilityChanged { visible: false });
    let (state, effects) = update(
        state,
        Msg::AppStarted {
            preferences: Preferences::default(),
        },
    );
    assert!(effects.contains(&Effect::StartTicker(Ticker::WatcherIndicator)));
    assert!(!effects.contains(&Effect::SendHeartbeat));
    assert!(!state.view().watcher.heartbeat_active);
}

#[test]
fn heartbeat_follows_visibility() {
    init_logging();
    let (state, effects) = update(started(), Msg::VisibilityChanged { visible: false });
    assert_eq!(effects, vec![Effect::StopTicker(Ticker::Heartbeat)]);
    assert!(!state.view().watcher.heartbeat_active);

    let (state, effects) = update(state, Msg::VisibilityChanged { visible: false });
    assert!(effects.is_empty());

    let (state, effects) = update(state, Msg::VisibilityChanged { visible: true });
    assert_eq!(
        effects,
        vec![Effect::SendHeartbeat, Effect::StartTicker(Ticker::Heartbeat)]
    );
    assert!(state.view().watcher.heartbeat_active);
}

#[test]
fn start_requires_prerequisites() {
    init_logging();
    let (state, _) = receive(
        started(),
        WatcherSource::Indicator,
        Ok(status(WatcherState::Stopped, false)),
    );
    let view = state.view().watcher;
    assert!(!view.can_start);
    assert_eq!(view.prerequisites.len(), 2);
    assert!(!view.prerequisites[1].met);
    assert_eq!(view.prerequisites[1].detail, "/media/tv");

    let (state, effects) = update(state, Msg::WatcherStartClicked);
    assert!(effects.is_empty());

    let (state, _) = receive(state, WatcherSource::Detail, Ok(status(WatcherState::Stopped, true)));
    assert!(state.view().watcher.can_start);
    let (state, effects) = update(state, Msg::WatcherStartClicked);
    assert_eq!(effects, vec![Effect::WatcherCommand(WatcherCommand::Start)]);
    assert!(state.view().watcher.command_pending);
    assert!(!state.view().watcher.can_start);

    let (state, _) = receive(
        state,
        WatcherSource::Command,
        Ok(status(WatcherState::Running, true)),
    );
    let view = state.view().watcher;
    assert_eq!(view.indicator, WatcherIndicator::Running);
    assert!(view.can_stop);
    assert!(!view.can_start);
}

#[test]
fn failed_command_is_surfaced() {
    init_logging();
    let (state, _) = receive(
        started(),
        WatcherSource::Indicator,
        Ok(status(WatcherState::Running, true)),
    );
    let (state, _) = update(state, Msg::WatcherStopClicked);
    let (state, effects) = receive(
        state,
        WatcherSource::Command,
        Err("http status 500".to_string()),
    );

    assert!(matches!(&effects[0], Effect::Notify(n)
        if n.level == NoticeLevel::Error && n.text.contains("stop")));
    assert!(!state.view().watcher.command_pending);
}

#[test]
fn failed_reads_degrade_indicator_silently() {
    init_logging();
    let (state, _) = receive(
        started(),
        WatcherSource::Indicator,
        Ok(status(WatcherState::Paused, true)),
    );
    assert_eq!(state.view().watcher.indicator, WatcherIndicator::Paused);

    let (state, effects) = receive(state, WatcherSource::Indicator, Err("timeout".to_string()));
    assert!(effects.is_empty());
    assert_eq!(state.view().watcher.indicator, WatcherIndicator::Unknown);

    let (state, effects) = receive(state, WatcherSource::Heartbeat, Err("timeout".to_string()));
    assert!(effects.is_empty());

    let (state, _) = receive(
        state,
        WatcherSource::Heartbeat,
        Ok(status(WatcherState::Running, true)),
    );
    assert_eq!(state.view().watcher.indicator, WatcherIndicator::Running);
}

#[test]
fn shutdown_stops_everything() {
    init_logging();
    let (state, effects) = update(started(), Msg::Shutdown);
    assert_eq!(effects, vec![Effect::StopAll]);
    assert!(!state.view().watcher.heartbeat_active);
}

#[test]
fn restored_watcher_page_starts_detail_poll() {
    init_logging();
    let (state, effects) = update(
        AppState::new(),
        Msg::AppStarted {
            preferences: Preferences {
                last_page: Some(curator_core::Page::Watcher),
                ..Preferences::default()
            },
        },
    );
    assert!(effects.contains(&Effect::StartTicker(Ticker::WatcherDetail)));
    assert!(state.view().watcher.detail_open);
}
