use curator_core::{
    JobKind, JobReport, ScanResult, SettingsSection, WatcherSource, WatcherStatus,
};
use thiserror::Error;

/// Results reported back from the engine thread.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    JobTriggered {
        kind: JobKind,
        result: Result<(), ApiError>,
    },
    JobPolled(JobReport),
    JobFinished(JobReport),
    StatusRead {
        kind: JobKind,
        result: Result<JobReport, ApiError>,
    },
    PollFailing {
        kind: JobKind,
        attempts: u32,
        error: ApiError,
    },
    PollRecovered {
        kind: JobKind,
    },
    SelectedScanFinished(Result<ScanResult, ApiError>),
    WatcherStatus {
        source: WatcherSource,
        result: Result<WatcherStatus, ApiError>,
    },
    SectionSaved {
        section: SettingsSection,
        result: Result<(), ApiError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureKind {
    #[error("invalid url")]
    InvalidUrl,
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("timeout")]
    Timeout,
    #[error("network error")]
    Network,
    #[error("malformed response")]
    Decode,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("could not start engine runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("could not build api client: {0}")]
    Client(#[from] ApiError),
}
