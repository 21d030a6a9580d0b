//! Curator core: pure state machine for job observation and the navigation guard.
mod effect;
mod guard;
mod import;
mod msg;
mod observe;
mod refresh;
mod scan;
mod state;
mod status;
mod update;
mod view_model;
mod watcher;

pub use effect::{
    Effect, FocusTarget, Notice, NoticeLevel, ReloadScope, Ticker, WatcherCommand, WatcherSource,
};
pub use guard::{GuardChoice, NavigationGuard};
pub use import::{ImportPhase, ImportProgress, ImportRequest, ImportState};
pub use msg::Msg;
pub use observe::{Observers, Reconcile};
pub use refresh::{RefreshPhase, RefreshReport, RefreshState};
pub use scan::{ScanPhase, ScanState};
pub use state::{
    AppState, Destination, Location, Modal, ModalKind, Page, Preferences, SettingsSection,
};
pub use status::{
    EpisodeId, ImportResult, ImportSummary, JobKind, JobReport, JobStatus, LibraryImportStatus,
    LogEntry, LogLevel, Prerequisite, ProcessedShow, RefreshStatus, ScanKind, ScanResult,
    ScanStatus, ShowOutcome, WatcherState, WatcherStatus,
};
pub use update::update;
pub use view_model::{
    AppViewModel, ImportReview, ImportStage, ImportView, RefreshView, ScanView, UnsavedPrompt,
    WatcherView,
};
pub use watcher::{WatcherIndicator, WatcherMonitor};
