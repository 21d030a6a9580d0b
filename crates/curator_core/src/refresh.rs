use crate::{AppState, Effect, JobKind, Notice, Reconcile, RefreshStatus, ReloadScope};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshPhase {
    #[default]
    Idle,
    Starting,
    Polling,
}

/// Results panel shown once per observed refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshReport {
    pub completed: Vec<String>,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RefreshState {
    pub(crate) phase: RefreshPhase,
    pub(crate) last: Option<RefreshStatus>,
    pub(crate) report: Option<RefreshReport>,
}

impl RefreshState {
    pub fn phase(&self) -> RefreshPhase {
        self.phase
    }

    pub fn last_status(&self) -> Option<&RefreshStatus> {
        self.last.as_ref()
    }

    pub fn report(&self) -> Option<&RefreshReport> {
        self.report.as_ref()
    }
}

pub(crate) fn on_clicked(state: &mut AppState) -> Vec<Effect> {
    if state.refresh.phase != RefreshPhase::Idle {
        return Vec::new();
    }
    state.refresh.phase = RefreshPhase::Starting;
    state.refresh.report = None;
    state.mark_render();
    vec![Effect::TriggerRefreshAll]
}

pub(crate) fn on_triggered(state: &mut AppState, result: Result<(), String>) -> Vec<Effect> {
    match (state.refresh.phase, result) {
        (RefreshPhase::Starting, Ok(())) => state.refresh.phase = RefreshPhase::Polling,
        (RefreshPhase::Polling, Ok(())) => {}
        (RefreshPhase::Starting, Err(message)) => {
            state.refresh.phase = RefreshPhase::Idle;
            state.mark_render();
            return vec![Effect::Notify(Notice::error(format!(
                "Could not start metadata refresh: {message}"
            )))];
        }
        _ => return Vec::new(),
    }
    state.mark_render();
    if state.observers.observe(JobKind::RefreshAll) {
        vec![Effect::StartPolling(JobKind::RefreshAll)]
    } else {
        Vec::new()
    }
}

pub(crate) fn on_polled(state: &mut AppState, status: RefreshStatus) -> Vec<Effect> {
    if state.refresh.phase == RefreshPhase::Polling {
        state.refresh.last = Some(status);
        state.mark_render();
    }
    Vec::new()
}

pub(crate) fn on_finished(state: &mut AppState, status: RefreshStatus) -> Vec<Effect> {
    let reporting = state.observers.complete(JobKind::RefreshAll);
    if state.refresh.phase == RefreshPhase::Polling {
        state.refresh.phase = RefreshPhase::Idle;
    }
    state.mark_render();
    if !reporting {
        state.refresh.last = Some(status);
        return Vec::new();
    }

    let notice = if status.errors.is_empty() {
        Notice::success(format!(
            "Metadata refresh complete: {} shows refreshed",
            status.completed.len()
        ))
    } else {
        Notice::warning(format!(
            "Metadata refresh complete: {} shows refreshed, {} failed",
            status.completed.len(),
            status.errors.len()
        ))
    };
    state.refresh.report = Some(RefreshReport {
        completed: status.completed.clone(),
        errors: status.errors.clone(),
    });
    state.refresh.last = Some(status);
    // Only show data changes; reading status again here would re-enter
    // reconciliation for the job that just ended.
    vec![Effect::Notify(notice), Effect::Reload(ReloadScope::Shows)]
}

pub(crate) fn on_status_read(state: &mut AppState, status: RefreshStatus) -> Vec<Effect> {
    match state.observers.reconcile(JobKind::RefreshAll, status.running) {
        Reconcile::Attached => {
            state.refresh.phase = RefreshPhase::Polling;
            state.refresh.last = Some(status);
            state.mark_render();
            vec![Effect::StartPolling(JobKind::RefreshAll)]
        }
        Reconcile::AlreadyAttached => on_polled(state, status),
        Reconcile::Idle => {
            state.refresh.last = Some(status);
            state.mark_render();
            Vec::new()
        }
        Reconcile::AwaitingPoller => Vec::new(),
    }
}

pub(crate) fn on_report_dismissed(state: &mut AppState) -> Vec<Effect> {
    if state.refresh.report.take().is_some() {
        state.mark_render();
    }
    Vec::new()
}
