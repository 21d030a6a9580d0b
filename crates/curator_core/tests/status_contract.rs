use curator_core::{
    ImportResult, JobStatus, LibraryImportStatus, LogLevel, RefreshStatus, ScanStatus,
    ShowOutcome, WatcherState, WatcherStatus,
};
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn never_started_scan_is_terminal_without_result() {
    let status: ScanStatus = serde_json::from_value(json!({ "running": false })).unwrap();
    assert!(!status.is_running());
    assert_eq!(status.result, None);
    assert_eq!(status.percent(), 0);
}

#[test]
fn refresh_percent_follows_current_over_total() {
    let status: RefreshStatus = serde_json::from_value(json!({
        "running": true,
        "total": 8,
        "current": 2,
        "currentShow": "Dark",
        "completed": ["Severance"],
        "errors": []
    }))
    .unwrap();
    assert_eq!(status.percent(), 25);
    assert_eq!(status.message(), Some("Dark"));
}

#[test]
fn import_gating_matches_outcomes() {
    let partial: ImportResult = serde_json::from_value(json!({
        "showsProcessed": [
            { "name": "Severance", "status": "added", "episodesMatched": 3, "totalEpisodes": 5 }
        ]
    }))
    .unwrap();
    assert!(!partial.can_continue());
    assert_eq!(partial.summary().partial, 1);

    let clean: ImportResult = serde_json::from_value(json!({
        "showsProcessed": [
            { "name": "Severance", "status": "added", "episodesMatched": 5, "totalEpisodes": 5 },
            { "name": "Dark", "status": "existing" }
        ]
    }))
    .unwrap();
    assert!(clean.can_continue());
    assert_eq!(clean.shows_processed[1].status, ShowOutcome::Existing);
}

#[test]
fn import_console_levels_include_skip() {
    let status: LibraryImportStatus = serde_json::from_value(json!({
        "running": true,
        "progress": 40,
        "console": [{ "time": "09:00:00", "level": "skip", "message": "Extras ignored" }]
    }))
    .unwrap();
    assert_eq!(status.console[0].level, LogLevel::Skip);
    assert_eq!(status.percent(), 40);
}

#[test]
fn watcher_status_uses_camel_case() {
    let status: WatcherStatus = serde_json::from_value(json!({
        "status": "paused",
        "pauseReason": "operator idle",
        "pendingFiles": 3,
        "queuedFiles": 1,
        "prerequisites": [{ "name": "Download folder", "met": false, "detail": "missing" }],
        "allPrerequisitesMet": false
    }))
    .unwrap();
    assert_eq!(status.status, WatcherState::Paused);
    assert_eq!(status.pause_reason.as_deref(), Some("operator idle"));
    assert!(!status.prerequisites[0].met);
}
