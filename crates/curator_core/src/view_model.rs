use crate::guard::PendingStage;
use crate::import::{ImportPhase, ImportProgress, ImportRequest};
use crate::refresh::{RefreshPhase, RefreshReport};
use crate::scan::ScanPhase;
use crate::watcher::WatcherIndicator;
use crate::{
    AppState, Destination, ImportResult, ImportSummary, JobKind, Location, LogEntry, Modal,
    Prerequisite, SettingsSection, WatcherStatus,
};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub location: Location,
    pub dirty_sections: Vec<SettingsSection>,
    pub prompt: Option<UnsavedPrompt>,
    pub modal: Option<Modal>,
    pub scan: ScanView,
    pub refresh: RefreshView,
    pub import: ImportView,
    pub watcher: WatcherView,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsavedPrompt {
    pub section: SettingsSection,
    pub destination: Destination,
    /// Save was chosen and the request is in flight.
    pub saving: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScanView {
    pub busy: bool,
    pub percent: Option<u8>,
    pub status_line: Option<String>,
    pub controls_enabled: bool,
    pub degraded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RefreshView {
    pub running: bool,
    pub current: u32,
    pub total: u32,
    pub current_show: Option<String>,
    pub can_start: bool,
    pub report: Option<RefreshReport>,
    pub degraded: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportStage {
    #[default]
    Idle,
    Starting,
    Scanning,
    Review,
    Minimized,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReview {
    pub result: ImportResult,
    pub summary: ImportSummary,
    pub can_continue: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImportView {
    pub stage: ImportStage,
    pub request: Option<ImportRequest>,
    pub batch: u32,
    pub progress: ImportProgress,
    pub console: Vec<LogEntry>,
    /// Index of the newest console entry; the list scrolls here each tick.
    pub console_tail: Option<usize>,
    pub review: Option<ImportReview>,
    /// Sidebar affordance shown while the review panel is minimized.
    pub minimized: Option<ImportSummary>,
    pub can_start: bool,
    pub degraded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WatcherView {
    pub indicator: WatcherIndicator,
    pub status: Option<WatcherStatus>,
    pub prerequisites: Vec<Prerequisite>,
    pub can_start: bool,
    pub can_stop: bool,
    pub command_pending: bool,
    pub detail_open: bool,
    pub heartbeat_active: bool,
}

impl AppViewModel {
    pub(crate) fn build(state: &AppState) -> Self {
        Self {
            location: state.location,
            dirty_sections: state.guard.dirty_sections(),
            prompt: state.guard.pending().map(|pending| UnsavedPrompt {
                section: pending.section,
                destination: pending.destination,
                saving: pending.stage == PendingStage::Saving,
            }),
            modal: state.modal.clone(),
            scan: scan_view(state),
            refresh: refresh_view(state),
            import: import_view(state),
            watcher: watcher_view(state),
        }
    }
}

fn scan_view(state: &AppState) -> ScanView {
    let (percent, status_line) = match state.scan.phase() {
        ScanPhase::Idle => match state.scan.selected_in_flight() {
            Some(episodes) => (None, Some(format!("Scanning {episodes} selected episode(s)..."))),
            None => (None, None),
        },
        ScanPhase::Starting(kind) => (Some(0), Some(format!("Starting {} scan...", kind.as_str()))),
        ScanPhase::Polling {
            percent, message, ..
        } => (Some(*percent), message.clone()),
    };
    ScanView {
        busy: !state.scan.controls_enabled(),
        percent,
        status_line,
        controls_enabled: state.scan.controls_enabled(),
        degraded: state.observers.is_degraded(JobKind::Scan),
    }
}

fn refresh_view(state: &AppState) -> RefreshView {
    let running = state.refresh.phase() != RefreshPhase::Idle;
    let last = state.refresh.last_status();
    RefreshView {
        running,
        current: last.map_or(0, |s| s.current),
        total: last.map_or(0, |s| s.total),
        current_show: last.and_then(|s| s.current_show.clone()),
        can_start: !running,
        report: state.refresh.report().cloned(),
        degraded: state.observers.is_degraded(JobKind::RefreshAll),
    }
}

fn import_view(state: &AppState) -> ImportView {
    let import = &state.import;
    let (stage, review, minimized) = match import.phase() {
        ImportPhase::Idle => (ImportStage::Idle, None, None),
        ImportPhase::Starting => (ImportStage::Starting, None, None),
        ImportPhase::Scanning => (ImportStage::Scanning, None, None),
        ImportPhase::AwaitingReview(result) => (
            ImportStage::Review,
            Some(ImportReview {
                result: result.clone(),
                summary: result.summary(),
                can_continue: import.can_continue(),
            }),
            None,
        ),
        ImportPhase::Minimized(result) => (ImportStage::Minimized, None, Some(result.summary())),
    };
    ImportView {
        stage,
        request: import.request().cloned(),
        batch: import.batch(),
        progress: import.progress.clone(),
        console: import.console().to_vec(),
        console_tail: import.console().len().checked_sub(1),
        review,
        minimized,
        can_start: stage == ImportStage::Idle,
        degraded: state.observers.is_degraded(JobKind::LibraryImport),
    }
}

fn watcher_view(state: &AppState) -> WatcherView {
    let monitor = &state.watcher;
    WatcherView {
        indicator: monitor.indicator(),
        status: monitor.status().cloned(),
        prerequisites: monitor
            .status()
            .map(|s| s.prerequisites.clone())
            .unwrap_or_default(),
        can_start: monitor.can_start(),
        can_stop: monitor.can_stop(),
        command_pending: monitor.command.is_some(),
        detail_open: monitor.detail_open(),
        heartbeat_active: monitor.heartbeat_active(),
    }
}
