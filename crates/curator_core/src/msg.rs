use crate::{
    Destination, EpisodeId, GuardChoice, JobKind, JobReport, Preferences, ScanKind, ScanResult,
    SettingsSection, WatcherSource, WatcherStatus,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Shell finished loading; kicks off watcher cadences and status reads.
    AppStarted { preferences: Preferences },
    /// Shell is tearing down.
    Shutdown,
    /// Window or tab visibility changed.
    VisibilityChanged { visible: bool },

    /// User asked to leave the current page or settings tab.
    NavigateRequested(Destination),
    /// An edit handler changed a field in a section.
    SectionEdited(SettingsSection),
    /// User clicked Save on a section outside of any navigation.
    SaveClicked(SettingsSection),
    /// User clicked Discard on a section outside of any navigation.
    DiscardClicked(SettingsSection),
    /// The section's save request returned.
    SectionSaveFinished {
        section: SettingsSection,
        result: Result<(), String>,
    },
    /// Answer to an unsaved-changes prompt.
    GuardChoice(GuardChoice),

    ScanClicked(ScanKind),
    ScanSelectedClicked(Vec<EpisodeId>),
    SelectedScanFinished(Result<ScanResult, String>),
    ModalDismissed,

    RefreshAllClicked,
    RefreshReportDismissed,

    ImportRequested { folder: String, limit: u32 },
    ImportContinueClicked,
    ImportFinishClicked,
    ImportMinimizeClicked,
    ImportRestoreClicked,
    ImportDismissClicked,

    /// A trigger request returned.
    JobTriggered {
        kind: JobKind,
        result: Result<(), String>,
    },
    /// Poller tick with a still-running status.
    JobPolled(JobReport),
    /// Poller delivered the terminal status and discarded its handle.
    JobFinished(JobReport),
    /// Status read outside of a poller (page load, app start).
    StatusRead(JobReport),
    /// Poller crossed the consecutive-failure threshold; it keeps polling.
    PollFailing {
        kind: JobKind,
        attempts: u32,
        message: String,
    },
    /// Poller succeeded again after `PollFailing`.
    PollRecovered { kind: JobKind },

    WatcherStartClicked,
    WatcherStopClicked,
    WatcherStatusReceived {
        source: WatcherSource,
        result: Result<WatcherStatus, String>,
    },

    /// Render tick.
    Tick,
    NoOp,
}
