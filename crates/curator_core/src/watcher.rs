use crate::{
    AppState, Effect, Notice, Page, Ticker, WatcherCommand, WatcherSource, WatcherState,
    WatcherStatus,
};

/// State of the persistent status dot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WatcherIndicator {
    #[default]
    Unknown,
    Stopped,
    Running,
    Paused,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WatcherMonitor {
    pub(crate) status: Option<WatcherStatus>,
    pub(crate) last_read_failed: bool,
    pub(crate) detail_open: bool,
    pub(crate) heartbeat_active: bool,
    pub(crate) command: Option<WatcherCommand>,
}

impl WatcherMonitor {
    pub fn status(&self) -> Option<&WatcherStatus> {
        self.status.as_ref()
    }

    pub fn indicator(&self) -> WatcherIndicator {
        match (&self.status, self.last_read_failed) {
            (None, _) | (_, true) => WatcherIndicator::Unknown,
            (Some(status), false) => match status.status {
                WatcherState::Stopped => WatcherIndicator::Stopped,
                WatcherState::Running => WatcherIndicator::Running,
                WatcherState::Paused => WatcherIndicator::Paused,
            },
        }
    }

    pub fn can_start(&self) -> bool {
        self.command.is_none()
            && self
                .status
                .as_ref()
                .is_some_and(|s| s.all_prerequisites_met && s.status != WatcherState::Running)
    }

    pub fn can_stop(&self) -> bool {
        self.command.is_none()
            && self
                .status
                .as_ref()
                .is_some_and(|s| s.status != WatcherState::Stopped)
    }

    pub fn heartbeat_active(&self) -> bool {
        self.heartbeat_active
    }

    pub fn detail_open(&self) -> bool {
        self.detail_open
    }
}

pub(crate) fn on_app_started(state: &mut AppState) -> Vec<Effect> {
    let mut effects = vec![
        Effect::StartTicker(Ticker::WatcherIndicator),
        Effect::FetchWatcherStatus(WatcherSource::Indicator),
    ];
    if state.visible {
        state.watcher.heartbeat_active = true;
        effects.push(Effect::SendHeartbeat);
        effects.push(Effect::StartTicker(Ticker::Heartbeat));
    }
    effects
}

/// Heartbeat follows visibility: hidden suspends it, visible resumes it with
/// an immediate beat.
pub(crate) fn on_visibility(state: &mut AppState, visible: bool) -> Vec<Effect> {
    if state.visible == visible {
        return Vec::new();
    }
    state.visible = visible;
    if !state.started {
        return Vec::new();
    }
    state.watcher.heartbeat_active = visible;
    if visible {
        vec![Effect::SendHeartbeat, Effect::StartTicker(Ticker::Heartbeat)]
    } else {
        vec![Effect::StopTicker(Ticker::Heartbeat)]
    }
}

pub(crate) fn on_page_entered(state: &mut AppState, page: Page) -> Vec<Effect> {
    if page != Page::Watcher {
        return Vec::new();
    }
    state.watcher.detail_open = true;
    vec![
        Effect::StartTicker(Ticker::WatcherDetail),
        Effect::FetchWatcherStatus(WatcherSource::Detail),
    ]
}

pub(crate) fn on_page_left(state: &mut AppState, page: Page) -> Vec<Effect> {
    if page != Page::Watcher {
        return Vec::new();
    }
    state.watcher.detail_open = false;
    vec![Effect::StopTicker(Ticker::WatcherDetail)]
}

pub(crate) fn on_start_clicked(state: &mut AppState) -> Vec<Effect> {
    if !state.watcher.can_start() {
        return Vec::new();
    }
    state.watcher.command = Some(WatcherCommand::Start);
    state.mark_render();
    vec![Effect::WatcherCommand(WatcherCommand::Start)]
}

pub(crate) fn on_stop_clicked(state: &mut AppState) -> Vec<Effect> {
    if !state.watcher.can_stop() {
        return Vec::new();
    }
    state.watcher.command = Some(WatcherCommand::Stop);
    state.mark_render();
    vec![Effect::WatcherCommand(WatcherCommand::Stop)]
}

pub(crate) fn on_status_received(
    state: &mut AppState,
    source: WatcherSource,
    result: Result<WatcherStatus, String>,
) -> Vec<Effect> {
    let command = if source == WatcherSource::Command {
        state.watcher.command.take()
    } else {
        None
    };
    match result {
        Ok(status) => {
            if state.watcher.status.as_ref() != Some(&status) || state.watcher.last_read_failed {
                state.mark_render();
            }
            state.watcher.status = Some(status);
            state.watcher.last_read_failed = false;
            Vec::new()
        }
        Err(message) => match source {
            WatcherSource::Command => {
                state.mark_render();
                let verb = match command {
                    Some(WatcherCommand::Stop) => "stop",
                    _ => "start",
                };
                vec![Effect::Notify(Notice::error(format!(
                    "Could not {verb} the watcher: {message}"
                )))]
            }
            // A missed beat is retried on the next cadence.
            WatcherSource::Heartbeat => Vec::new(),
            WatcherSource::Indicator | WatcherSource::Detail => {
                if !state.watcher.last_read_failed {
                    state.mark_render();
                }
                state.watcher.last_read_failed = true;
                Vec::new()
            }
        },
    }
}
