use crate::{Destination, EpisodeId, JobKind, Preferences, ScanKind, SettingsSection};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    TriggerScan(ScanKind),
    /// Inline scan of specific episodes; answered by `Msg::SelectedScanFinished`.
    ScanEpisodes(Vec<EpisodeId>),
    TriggerRefreshAll,
    StartImport { folder: String, limit: u32 },
    StartPolling(JobKind),
    /// One-shot status read; answered by `Msg::StatusRead`.
    ReadStatus(JobKind),
    StartTicker(Ticker),
    StopTicker(Ticker),
    FetchWatcherStatus(WatcherSource),
    SendHeartbeat,
    WatcherCommand(WatcherCommand),
    SaveSection(SettingsSection),
    /// Reset the section's form to its last saved values.
    DiscardSection(SettingsSection),
    /// Ask the user to Save, Discard or Cancel; answered by `Msg::GuardChoice`.
    PromptUnsaved {
        section: SettingsSection,
        destination: Destination,
    },
    Notify(Notice),
    Reload(ReloadScope),
    Focus(FocusTarget),
    SavePreferences(Preferences),
    /// Cancel every poller and ticker.
    StopAll,
}

/// Periodic background activities that never reach a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Ticker {
    WatcherIndicator,
    WatcherDetail,
    Heartbeat,
}

/// Which cadence produced a watcher status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherSource {
    Indicator,
    Detail,
    Heartbeat,
    Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherCommand {
    Start,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadScope {
    /// Whatever the current page shows.
    CurrentPage,
    /// Show list and show details; the only data a metadata refresh touches.
    Shows,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget {
    EpisodeSelection,
    ImportFolder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}
