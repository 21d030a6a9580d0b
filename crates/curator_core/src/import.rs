use crate::{
    AppState, Effect, FocusTarget, ImportResult, JobKind, JobStatus, LibraryImportStatus,
    LogEntry, Notice, Reconcile,
};

/// Managed import flow. Review results live inside the phase so a result
/// can only exist while there is something to review or restore.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ImportPhase {
    #[default]
    Idle,
    Starting,
    Scanning,
    AwaitingReview(ImportResult),
    /// Review panel collapsed to the sidebar; restoring shows this exact result.
    Minimized(ImportResult),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRequest {
    pub folder: String,
    pub limit: u32,
}

/// Live counters of the running batch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImportProgress {
    pub percent: u8,
    pub shows_found: u32,
    pub shows_added: u32,
    pub shows_skipped: u32,
    pub episodes_matched: u32,
    pub current_show: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImportState {
    pub(crate) phase: ImportPhase,
    pub(crate) request: Option<ImportRequest>,
    pub(crate) batch: u32,
    pub(crate) progress: ImportProgress,
    pub(crate) console: Vec<LogEntry>,
}

impl ImportState {
    pub fn phase(&self) -> &ImportPhase {
        &self.phase
    }

    pub fn request(&self) -> Option<&ImportRequest> {
        self.request.as_ref()
    }

    pub fn batch(&self) -> u32 {
        self.batch
    }

    pub fn console(&self) -> &[LogEntry] {
        &self.console
    }

    /// A finished batch is on screen or in the sidebar. Its result, request
    /// and console stay untouched until the user finishes or dismisses it.
    pub fn is_reviewing(&self) -> bool {
        matches!(
            self.phase,
            ImportPhase::AwaitingReview(_) | ImportPhase::Minimized(_)
        )
    }

    pub fn can_continue(&self) -> bool {
        match &self.phase {
            ImportPhase::AwaitingReview(result) => {
                self.request.is_some() && result.can_continue()
            }
            _ => false,
        }
    }

    fn absorb(&mut self, status: &LibraryImportStatus) {
        self.progress = ImportProgress {
            percent: status.percent(),
            shows_found: status.shows_found,
            shows_added: status.shows_added,
            shows_skipped: status.shows_skipped,
            episodes_matched: status.episodes_matched,
            current_show: status.current_show.clone(),
        };
        merge_console(&mut self.console, &status.console);
    }

    fn begin_batch(&mut self) -> Option<Effect> {
        let request = self.request.as_ref()?;
        self.phase = ImportPhase::Starting;
        self.progress = ImportProgress::default();
        self.console.clear();
        Some(Effect::StartImport {
            folder: request.folder.clone(),
            limit: request.limit,
        })
    }
}

/// The server resends its whole log each tick. Entries past what we hold are
/// appended; a log shorter than ours belongs to a new run and replaces it.
fn merge_console(local: &mut Vec<LogEntry>, remote: &[LogEntry]) {
    if remote.len() < local.len() {
        local.clear();
    }
    let known = local.len();
    local.extend(remote[known..].iter().cloned());
}

pub(crate) fn on_requested(state: &mut AppState, folder: String, limit: u32) -> Vec<Effect> {
    let folder = folder.trim().to_string();
    if folder.is_empty() || limit == 0 {
        return vec![Effect::Focus(FocusTarget::ImportFolder)];
    }
    if state.import.phase != ImportPhase::Idle {
        return Vec::new();
    }
    state.preferences.import_folder = Some(folder.clone());
    state.preferences.import_limit = Some(limit);
    state.import.request = Some(ImportRequest { folder, limit });
    state.import.batch = 1;
    state.mark_render();

    let mut effects: Vec<Effect> = state.import.begin_batch().into_iter().collect();
    effects.push(Effect::SavePreferences(state.preferences.clone()));
    effects
}

pub(crate) fn on_triggered(state: &mut AppState, result: Result<(), String>) -> Vec<Effect> {
    let starting = state.import.phase == ImportPhase::Starting;
    let scanning = state.import.phase == ImportPhase::Scanning;
    match (starting, scanning, result) {
        (true, _, Ok(())) => state.import.phase = ImportPhase::Scanning,
        (_, true, Ok(())) => {}
        (true, _, Err(message)) => {
            state.import.phase = ImportPhase::Idle;
            state.mark_render();
            return vec![Effect::Notify(Notice::error(format!(
                "Could not start library import: {message}"
            )))];
        }
        _ => return Vec::new(),
    }
    state.mark_render();
    if state.observers.observe(JobKind::LibraryImport) {
        vec![Effect::StartPolling(JobKind::LibraryImport)]
    } else {
        Vec::new()
    }
}

pub(crate) fn on_polled(state: &mut AppState, status: &LibraryImportStatus) -> Vec<Effect> {
    if state.import.phase == ImportPhase::Scanning {
        state.import.absorb(status);
        state.mark_render();
    }
    Vec::new()
}

pub(crate) fn on_finished(state: &mut AppState, status: LibraryImportStatus) -> Vec<Effect> {
    let reporting = state.observers.complete(JobKind::LibraryImport);
    if state.import.is_reviewing() {
        return Vec::new();
    }
    state.import.absorb(&status);
    state.mark_render();
    if !reporting {
        if matches!(state.import.phase, ImportPhase::Starting | ImportPhase::Scanning) {
            state.import.phase = ImportPhase::Idle;
        }
        return Vec::new();
    }

    match status.result {
        Some(ImportResult {
            error: Some(error), ..
        }) => {
            state.import.phase = ImportPhase::Idle;
            vec![Effect::Notify(Notice::error(format!(
                "Library import failed: {error}"
            )))]
        }
        Some(result) => {
            let summary = result.summary();
            let text = format!(
                "Import batch {} finished: {} added, {} existing, {} need attention",
                state.import.batch,
                summary.added,
                summary.existing,
                summary.partial + summary.not_found + summary.errors
            );
            let notice = if result.can_continue() {
                Notice::success(text)
            } else {
                Notice::warning(text)
            };
            state.import.phase = ImportPhase::AwaitingReview(result);
            vec![Effect::Notify(notice)]
        }
        None => {
            state.import.phase = ImportPhase::Idle;
            vec![Effect::Notify(Notice::warning(
                "Library import finished without a result",
            ))]
        }
    }
}

pub(crate) fn on_status_read(state: &mut AppState, status: &LibraryImportStatus) -> Vec<Effect> {
    // A run started elsewhere is picked up once the review closes.
    if state.import.is_reviewing() {
        return Vec::new();
    }
    match state.observers.reconcile(JobKind::LibraryImport, status.running) {
        Reconcile::Attached => {
            if matches!(state.import.phase, ImportPhase::Idle | ImportPhase::Starting) {
                state.import.phase = ImportPhase::Scanning;
            }
            state.import.absorb(status);
            state.mark_render();
            vec![Effect::StartPolling(JobKind::LibraryImport)]
        }
        Reconcile::AlreadyAttached => on_polled(state, status),
        Reconcile::Idle | Reconcile::AwaitingPoller => Vec::new(),
    }
}

pub(crate) fn on_continue(state: &mut AppState) -> Vec<Effect> {
    if !state.import.can_continue() {
        return Vec::new();
    }
    state.import.batch += 1;
    state.mark_render();
    state.import.begin_batch().into_iter().collect()
}

/// Ends the continue loop, dropping the batch under review, and reads the
/// import status again to pick up a run started meanwhile.
pub(crate) fn on_finish(state: &mut AppState) -> Vec<Effect> {
    if !state.import.is_reviewing() {
        return Vec::new();
    }
    state.import.phase = ImportPhase::Idle;
    state.import.batch = 0;
    state.mark_render();
    vec![Effect::ReadStatus(JobKind::LibraryImport)]
}

pub(crate) fn on_minimize(state: &mut AppState) -> Vec<Effect> {
    let phase = std::mem::take(&mut state.import.phase);
    state.import.phase = match phase {
        ImportPhase::AwaitingReview(result) => {
            state.mark_render();
            ImportPhase::Minimized(result)
        }
        other => other,
    };
    Vec::new()
}

pub(crate) fn on_restore(state: &mut AppState) -> Vec<Effect> {
    let phase = std::mem::take(&mut state.import.phase);
    state.import.phase = match phase {
        ImportPhase::Minimized(result) => {
            state.mark_render();
            ImportPhase::AwaitingReview(result)
        }
        other => other,
    };
    Vec::new()
}

pub(crate) fn on_dismiss(state: &mut AppState) -> Vec<Effect> {
    on_finish(state)
}
