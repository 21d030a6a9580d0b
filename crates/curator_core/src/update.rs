use crate::{
    guard, import, refresh, scan, watcher, AppState, Effect, JobKind, JobReport, Msg, Notice,
    Preferences, ReloadScope,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::AppStarted { preferences } => on_app_started(&mut state, preferences),
        Msg::Shutdown => on_shutdown(&mut state),
        Msg::VisibilityChanged { visible } => watcher::on_visibility(&mut state, visible),

        Msg::NavigateRequested(destination) => guard::on_navigate(&mut state, destination),
        Msg::SectionEdited(section) => guard::on_edited(&mut state, section),
        Msg::SaveClicked(section) => guard::on_save_clicked(&mut state, section),
        Msg::DiscardClicked(section) => guard::on_discard_clicked(&mut state, section),
        Msg::SectionSaveFinished { section, result } => {
            guard::on_save_finished(&mut state, section, result)
        }
        Msg::GuardChoice(choice) => guard::on_choice(&mut state, choice),

        Msg::ScanClicked(kind) => scan::on_clicked(&mut state, kind),
        Msg::ScanSelectedClicked(episodes) => scan::on_selected_clicked(&mut state, episodes),
        Msg::SelectedScanFinished(result) => scan::on_selected_finished(&mut state, result),
        Msg::ModalDismissed => scan::on_modal_dismissed(&mut state),

        Msg::RefreshAllClicked => refresh::on_clicked(&mut state),
        Msg::RefreshReportDismissed => refresh::on_report_dismissed(&mut state),

        Msg::ImportRequested { folder, limit } => import::on_requested(&mut state, folder, limit),
        Msg::ImportContinueClicked => import::on_continue(&mut state),
        Msg::ImportFinishClicked => import::on_finish(&mut state),
        Msg::ImportMinimizeClicked => import::on_minimize(&mut state),
        Msg::ImportRestoreClicked => import::on_restore(&mut state),
        Msg::ImportDismissClicked => import::on_dismiss(&mut state),

        Msg::JobTriggered { kind, result } => match kind {
            JobKind::Scan => scan::on_triggered(&mut state, result),
            JobKind::RefreshAll => refresh::on_triggered(&mut state, result),
            JobKind::LibraryImport => import::on_triggered(&mut state, result),
        },
        Msg::JobPolled(report) => match report {
            JobReport::Scan(status) => scan::on_polled(&mut state, &status),
            JobReport::RefreshAll(status) => refresh::on_polled(&mut state, status),
            JobReport::LibraryImport(status) => import::on_polled(&mut state, &status),
        },
        Msg::JobFinished(report) => match report {
            JobReport::Scan(status) => scan::on_finished(&mut state, status),
            JobReport::RefreshAll(status) => refresh::on_finished(&mut state, status),
            JobReport::LibraryImport(status) => import::on_finished(&mut state, status),
        },
        Msg::StatusRead(report) => match report {
            JobReport::Scan(status) => scan::on_status_read(&mut state, &status),
            JobReport::RefreshAll(status) => refresh::on_status_read(&mut state, status),
            JobReport::LibraryImport(status) => import::on_status_read(&mut state, &status),
        },
        Msg::PollFailing {
            kind,
            attempts,
            message,
        } => {
            if state.observers.mark_degraded(kind) {
                state.mark_render();
                vec![Effect::Notify(Notice::warning(format!(
                    "Lost contact with {} status after {attempts} attempts ({message}); retrying",
                    kind.label()
                )))]
            } else {
                Vec::new()
            }
        }
        Msg::PollRecovered { kind } => {
            if state.observers.mark_recovered(kind) {
                state.mark_render();
                vec![Effect::Notify(Notice::info(format!(
                    "Reconnected to {} status",
                    kind.label()
                )))]
            } else {
                Vec::new()
            }
        }

        Msg::WatcherStartClicked => watcher::on_start_clicked(&mut state),
        Msg::WatcherStopClicked => watcher::on_stop_clicked(&mut state),
        Msg::WatcherStatusReceived { source, result } => {
            watcher::on_status_received(&mut state, source, result)
        }

        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn on_app_started(state: &mut AppState, preferences: Preferences) -> Vec<Effect> {
    if state.started {
        return Vec::new();
    }
    state.started = true;
    if let Some(tab) = preferences.settings_tab {
        state.location.tab = tab;
    }
    if let Some(page) = preferences.last_page {
        state.location.page = page;
    }
    state.preferences = preferences;
    state.mark_render();

    let page = state.location.page;
    let mut effects = watcher::on_app_started(state);
    effects.extend(watcher::on_page_entered(state, page));
    // Every job kind is read once so work begun before a restart is picked up.
    effects.extend(JobKind::ALL.iter().map(|kind| Effect::ReadStatus(*kind)));
    effects.push(Effect::Reload(ReloadScope::CurrentPage));
    effects
}

fn on_shutdown(state: &mut AppState) -> Vec<Effect> {
    if !state.started {
        return Vec::new();
    }
    state.started = false;
    state.observers.clear();
    state.watcher.heartbeat_active = false;
    state.watcher.detail_open = false;
    vec![Effect::StopAll]
}
