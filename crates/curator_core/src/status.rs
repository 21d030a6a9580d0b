//! Status contracts reported by the server's background jobs.
//!
//! These shapes are owned by the server; the client only reads them. Every
//! optional field defaults so older servers that omit a field still decode.

use serde::{Deserialize, Serialize};

/// Identifier of an episode as used by the selected-episode scan.
pub type EpisodeId = u64;

/// Long-running job kinds observed through a status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    Scan,
    RefreshAll,
    LibraryImport,
}

impl JobKind {
    pub const ALL: [JobKind; 3] = [JobKind::Scan, JobKind::RefreshAll, JobKind::LibraryImport];

    pub fn label(self) -> &'static str {
        match self {
            JobKind::Scan => "library scan",
            JobKind::RefreshAll => "metadata refresh",
            JobKind::LibraryImport => "library import",
        }
    }
}

/// Common view over every job status payload.
pub trait JobStatus {
    fn is_running(&self) -> bool;

    /// Progress in percent, clamped to `0..=100`.
    fn percent(&self) -> u8;

    fn message(&self) -> Option<&str> {
        None
    }
}

fn clamp_percent(value: f32) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.clamp(0.0, 100.0).round() as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanKind {
    Full,
    Quick,
    Ongoing,
}

impl ScanKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ScanKind::Full => "full",
            ScanKind::Quick => "quick",
            ScanKind::Ongoing => "ongoing",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScanStatus {
    pub running: bool,
    pub progress: f32,
    pub message: Option<String>,
    pub result: Option<ScanResult>,
}

impl JobStatus for ScanStatus {
    fn is_running(&self) -> bool {
        self.running
    }

    fn percent(&self) -> u8 {
        clamp_percent(self.progress)
    }

    fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScanResult {
    #[serde(rename = "type")]
    pub scan_type: Option<String>,
    pub episodes_matched: u32,
    pub unmatched_files: Vec<String>,
    pub errors: Vec<String>,
    /// Fatal error reported by the scanner. Distinct from `errors`, which
    /// lists per-file problems in an otherwise successful scan.
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RefreshStatus {
    pub running: bool,
    pub total: u32,
    pub current: u32,
    pub current_show: Option<String>,
    pub completed: Vec<String>,
    pub errors: Vec<String>,
}

impl JobStatus for RefreshStatus {
    fn is_running(&self) -> bool {
        self.running
    }

    fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        clamp_percent(self.current as f32 * 100.0 / self.total as f32)
    }

    fn message(&self) -> Option<&str> {
        self.current_show.as_deref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(default)]
    pub time: String,
    pub level: LogLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LibraryImportStatus {
    pub running: bool,
    pub progress: f32,
    pub shows_found: u32,
    pub shows_added: u32,
    pub shows_skipped: u32,
    pub episodes_matched: u32,
    pub current_show: Option<String>,
    pub console: Vec<LogEntry>,
    pub result: Option<ImportResult>,
}

impl JobStatus for LibraryImportStatus {
    fn is_running(&self) -> bool {
        self.running
    }

    fn percent(&self) -> u8 {
        clamp_percent(self.progress)
    }

    fn message(&self) -> Option<&str> {
        self.current_show.as_deref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShowOutcome {
    Added,
    Existing,
    NotFound,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedShow {
    pub name: String,
    pub status: ShowOutcome,
    #[serde(default)]
    pub episodes_matched: u32,
    #[serde(default)]
    pub total_episodes: u32,
    #[serde(default)]
    pub detail: Option<String>,
}

impl ProcessedShow {
    /// Whether this show lets the import loop continue. An added show with
    /// unmatched episodes counts as an error even though it was imported.
    pub fn is_clean(&self) -> bool {
        match self.status {
            ShowOutcome::Added => self.episodes_matched >= self.total_episodes,
            ShowOutcome::Existing => true,
            ShowOutcome::NotFound | ShowOutcome::Error => false,
        }
    }

    pub fn is_partial(&self) -> bool {
        self.status == ShowOutcome::Added && self.episodes_matched < self.total_episodes
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImportResult {
    pub shows_processed: Vec<ProcessedShow>,
    pub error: Option<String>,
}

impl ImportResult {
    /// "Continue Import" gate. An empty batch means the folder is exhausted,
    /// so there is nothing to continue with.
    pub fn can_continue(&self) -> bool {
        !self.shows_processed.is_empty() && self.shows_processed.iter().all(ProcessedShow::is_clean)
    }

    pub fn summary(&self) -> ImportSummary {
        let mut summary = ImportSummary::default();
        for show in &self.shows_processed {
            match show.status {
                ShowOutcome::Added if show.is_partial() => summary.partial += 1,
                ShowOutcome::Added => summary.added += 1,
                ShowOutcome::Existing => summary.existing += 1,
                ShowOutcome::NotFound => summary.not_found += 1,
                ShowOutcome::Error => summary.errors += 1,
            }
        }
        summary
    }
}

/// Outcome counts for one import batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportSummary {
    pub added: usize,
    pub partial: usize,
    pub existing: usize,
    pub not_found: usize,
    pub errors: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatcherState {
    #[default]
    Stopped,
    Running,
    Paused,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prerequisite {
    pub name: String,
    pub met: bool,
    #[serde(default)]
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WatcherStatus {
    pub status: WatcherState,
    pub pause_reason: Option<String>,
    pub pending_files: u32,
    pub queued_files: u32,
    pub prerequisites: Vec<Prerequisite>,
    pub all_prerequisites_met: bool,
}

/// A status payload tagged with its job kind.
#[derive(Debug, Clone, PartialEq)]
pub enum JobReport {
    Scan(ScanStatus),
    RefreshAll(RefreshStatus),
    LibraryImport(LibraryImportStatus),
}

impl JobReport {
    pub fn kind(&self) -> JobKind {
        match self {
            JobReport::Scan(_) => JobKind::Scan,
            JobReport::RefreshAll(_) => JobKind::RefreshAll,
            JobReport::LibraryImport(_) => JobKind::LibraryImport,
        }
    }
}

impl JobStatus for JobReport {
    fn is_running(&self) -> bool {
        match self {
            JobReport::Scan(status) => status.is_running(),
            JobReport::RefreshAll(status) => status.is_running(),
            JobReport::LibraryImport(status) => status.is_running(),
        }
    }

    fn percent(&self) -> u8 {
        match self {
            JobReport::Scan(status) => status.percent(),
            JobReport::RefreshAll(status) => status.percent(),
            JobReport::LibraryImport(status) => status.percent(),
        }
    }

    fn message(&self) -> Option<&str> {
        match self {
            JobReport::Scan(status) => status.message(),
            JobReport::RefreshAll(status) => status.message(),
            JobReport::LibraryImport(status) => status.message(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn show(status: ShowOutcome, matched: u32, total: u32) -> ProcessedShow {
        ProcessedShow {
            name: "Show".to_string(),
            status,
            episodes_matched: matched,
            total_episodes: total,
            detail: None,
        }
    }

    #[test]
    fn partial_added_show_blocks_continue() {
        let result = ImportResult {
            shows_processed: vec![
                show(ShowOutcome::Added, 5, 5),
                show(ShowOutcome::Added, 3, 5),
            ],
            error: None,
        };
        assert!(!result.can_continue());
        assert_eq!(result.summary().partial, 1);
        assert_eq!(result.summary().added, 1);
    }

    #[test]
    fn complete_and_existing_shows_allow_continue() {
        let result = ImportResult {
            shows_processed: vec![
                show(ShowOutcome::Added, 5, 5),
                show(ShowOutcome::Existing, 0, 12),
            ],
            error: None,
        };
        assert!(result.can_continue());
    }

    #[test]
    fn not_found_and_empty_batches_block_continue() {
        let missing = ImportResult {
            shows_processed: vec![show(ShowOutcome::NotFound, 0, 0)],
            error: None,
        };
        assert!(!missing.can_continue());
        assert!(!ImportResult::default().can_continue());
    }

    #[test]
    fn refresh_percent_handles_zero_total() {
        let status = RefreshStatus {
            running: true,
            total: 0,
            ..RefreshStatus::default()
        };
        assert_eq!(status.percent(), 0);
        let status = RefreshStatus {
            running: true,
            total: 4,
            current: 1,
            ..RefreshStatus::default()
        };
        assert_eq!(status.percent(), 25);
    }

    #[test]
    fn scan_percent_is_clamped() {
        let status = ScanStatus {
            running: true,
            progress: 140.0,
            ..ScanStatus::default()
        };
        assert_eq!(status.percent(), 100);
    }
}
