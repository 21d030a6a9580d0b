use crate::{
    AppState, Effect, EpisodeId, FocusTarget, JobKind, JobStatus, Modal, ModalKind, Notice,
    Reconcile, ReloadScope, ScanKind, ScanResult, ScanStatus,
};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ScanPhase {
    #[default]
    Idle,
    Starting(ScanKind),
    /// `kind` is `None` when the scan was picked up from a status read.
    Polling {
        kind: Option<ScanKind>,
        percent: u8,
        message: Option<String>,
    },
}

/// The selected-episode scan is tracked beside `phase`: a status read may
/// attach a poller while that single request is still out.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScanState {
    pub(crate) phase: ScanPhase,
    pub(crate) selected_in_flight: Option<usize>,
}

impl ScanState {
    pub fn phase(&self) -> &ScanPhase {
        &self.phase
    }

    /// Episode count of the selected-episode scan awaiting its response.
    pub fn selected_in_flight(&self) -> Option<usize> {
        self.selected_in_flight
    }

    /// Scan buttons are disabled for the whole Starting + Polling span and
    /// while a selected-episode scan is out.
    pub fn controls_enabled(&self) -> bool {
        self.phase == ScanPhase::Idle && self.selected_in_flight.is_none()
    }

    fn show_progress(&mut self, kind: Option<ScanKind>, status: &ScanStatus) {
        let kind = match &self.phase {
            ScanPhase::Polling { kind: known, .. } => known.or(kind),
            _ => kind,
        };
        self.phase = ScanPhase::Polling {
            kind,
            percent: status.percent(),
            message: status.message.clone(),
        };
    }
}

pub(crate) fn on_clicked(state: &mut AppState, kind: ScanKind) -> Vec<Effect> {
    if !state.scan.controls_enabled() {
        return Vec::new();
    }
    state.scan.phase = ScanPhase::Starting(kind);
    state.mark_render();
    vec![Effect::TriggerScan(kind)]
}

pub(crate) fn on_triggered(state: &mut AppState, result: Result<(), String>) -> Vec<Effect> {
    let starting = match state.scan.phase {
        ScanPhase::Starting(kind) => Some(kind),
        _ => None,
    };
    let polling = matches!(state.scan.phase, ScanPhase::Polling { .. });
    match (starting, polling, result) {
        (Some(kind), _, Ok(())) => {
            state.scan.phase = ScanPhase::Polling {
                kind: Some(kind),
                percent: 0,
                message: None,
            };
        }
        (None, true, Ok(())) => {}
        (Some(_), _, Err(message)) => {
            state.scan.phase = ScanPhase::Idle;
            state.mark_render();
            return vec![Effect::Notify(Notice::error(format!(
                "Could not start scan: {message}"
            )))];
        }
        _ => return Vec::new(),
    }
    state.mark_render();
    if state.observers.observe(JobKind::Scan) {
        vec![Effect::StartPolling(JobKind::Scan)]
    } else {
        Vec::new()
    }
}

pub(crate) fn on_polled(state: &mut AppState, status: &ScanStatus) -> Vec<Effect> {
    if matches!(state.scan.phase, ScanPhase::Polling { .. }) {
        state.scan.show_progress(None, status);
        state.mark_render();
    }
    Vec::new()
}

pub(crate) fn on_finished(state: &mut AppState, status: ScanStatus) -> Vec<Effect> {
    let reporting = state.observers.complete(JobKind::Scan);
    if matches!(state.scan.phase, ScanPhase::Polling { .. }) {
        state.scan.phase = ScanPhase::Idle;
        state.mark_render();
    }
    if !reporting {
        return Vec::new();
    }
    match status.result {
        Some(ScanResult {
            error: Some(error), ..
        }) => vec![Effect::Notify(Notice::error(format!("Scan failed: {error}")))],
        Some(result) => vec![
            Effect::Notify(Notice::success(completion_text(&result))),
            Effect::Reload(ReloadScope::CurrentPage),
        ],
        None => vec![Effect::Notify(Notice::warning(
            "Scan finished without a result",
        ))],
    }
}

pub(crate) fn on_status_read(state: &mut AppState, status: &ScanStatus) -> Vec<Effect> {
    match state.observers.reconcile(JobKind::Scan, status.running) {
        Reconcile::Attached => {
            state.scan.show_progress(None, status);
            state.mark_render();
            vec![Effect::StartPolling(JobKind::Scan)]
        }
        Reconcile::AlreadyAttached => on_polled(state, status),
        Reconcile::Idle | Reconcile::AwaitingPoller => Vec::new(),
    }
}

pub(crate) fn on_selected_clicked(state: &mut AppState, episodes: Vec<EpisodeId>) -> Vec<Effect> {
    if episodes.is_empty() {
        return vec![Effect::Focus(FocusTarget::EpisodeSelection)];
    }
    if !state.scan.controls_enabled() || state.modal.is_some() {
        return Vec::new();
    }
    state.scan.selected_in_flight = Some(episodes.len());
    state.modal = Some(Modal {
        kind: ModalKind::SelectedScan,
        title: "Scanning selected episodes".to_string(),
        body: format!("Scanning {} episode(s)...", episodes.len()),
        dismissible: false,
    });
    state.mark_render();
    vec![Effect::ScanEpisodes(episodes)]
}

pub(crate) fn on_selected_finished(
    state: &mut AppState,
    result: Result<ScanResult, String>,
) -> Vec<Effect> {
    if state.scan.selected_in_flight.take().is_none() {
        return Vec::new();
    }
    state.mark_render();

    let (body, effects) = match result {
        Ok(ScanResult {
            error: Some(error), ..
        }) => (
            format!("Scan failed: {error}"),
            vec![Effect::Notify(Notice::error(format!("Scan failed: {error}")))],
        ),
        Ok(result) => (
            completion_text(&result),
            vec![Effect::Reload(ReloadScope::CurrentPage)],
        ),
        Err(message) => (
            format!("Scan failed: {message}"),
            vec![Effect::Notify(Notice::error(format!(
                "Could not scan selected episodes: {message}"
            )))],
        ),
    };
    if let Some(modal) = state.modal.as_mut().filter(|m| m.kind == ModalKind::SelectedScan) {
        modal.body = body;
        modal.dismissible = true;
    }
    effects
}

pub(crate) fn on_modal_dismissed(state: &mut AppState) -> Vec<Effect> {
    if state.modal.as_ref().is_some_and(|modal| modal.dismissible) {
        state.modal = None;
        state.mark_render();
    }
    Vec::new()
}

fn completion_text(result: &ScanResult) -> String {
    let mut text = format!("Scan complete: {} episodes matched", result.episodes_matched);
    if !result.unmatched_files.is_empty() {
        text.push_str(&format!(", {} unmatched files", result.unmatched_files.len()));
    }
    if !result.errors.is_empty() {
        text.push_str(&format!(", {} errors", result.errors.len()));
    }
    text
}
