use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use curator_core::{
    EpisodeId, JobKind, JobReport, LibraryImportStatus, RefreshStatus, ScanKind, ScanResult,
    ScanStatus, SettingsSection, Ticker, WatcherCommand, WatcherSource, WatcherState,
    WatcherStatus,
};
use curator_engine::{
    ApiError, EngineCommand, EngineEvent, EngineHandle, FailureKind, LibraryApi, PollSettings,
};
use pretty_assertions::assert_eq;

#[derive(Default)]
struct FakeApi {
    scan: Mutex<VecDeque<ScanStatus>>,
    refresh_fails: bool,
}

#[async_trait::async_trait]
impl LibraryApi for FakeApi {
    async fn trigger_scan(&self, _kind: ScanKind) -> Result<(), ApiError> {
        Ok(())
    }

    async fn scan_episodes(&self, episodes: &[EpisodeId]) -> Result<ScanResult, ApiError> {
        Ok(ScanResult {
            episodes_matched: episodes.len() as u32,
            ..ScanResult::default()
        })
    }

    async fn scan_status(&self) -> Result<ScanStatus, ApiError> {
        Ok(self.scan.lock().unwrap().pop_front().unwrap_or_default())
    }

    async fn trigger_refresh_all(&self) -> Result<(), ApiError> {
        if self.refresh_fails {
            return Err(ApiError {
                kind: FailureKind::HttpStatus(409),
                message: "refresh already running".to_string(),
            });
        }
        Ok(())
    }

    async fn refresh_status(&self) -> Result<RefreshStatus, ApiError> {
        Ok(RefreshStatus {
            running: true,
            total: 4,
            current: 1,
            ..RefreshStatus::default()
        })
    }

    async fn start_library_import(&self, _folder: &str, _limit: u32) -> Result<(), ApiError> {
        Ok(())
    }

    async fn library_import_status(&self) -> Result<LibraryImportStatus, ApiError> {
        Ok(LibraryImportStatus::default())
    }

    async fn watcher_status(&self) -> Result<WatcherStatus, ApiError> {
        Ok(WatcherStatus {
            status: WatcherState::Paused,
            ..WatcherStatus::default()
        })
    }

    async fn watcher_command(&self, _command: WatcherCommand) -> Result<WatcherStatus, ApiError> {
        Ok(WatcherStatus {
            status: WatcherState::Running,
            ..WatcherStatus::default()
        })
    }

    async fn heartbeat(&self) -> Result<WatcherStatus, ApiError> {
        self.watcher_status().await
    }

    async fn save_settings(
        &self,
        _section: SettingsSection,
        _draft: &serde_json::Value,
    ) -> Result<(), ApiError> {
        Ok(())
    }
}

fn fast_settings() -> PollSettings {
    PollSettings {
        scan_interval: Duration::from_millis(10),
        refresh_interval: Duration::from_millis(10),
        import_interval: Duration::from_millis(10),
        indicator_interval: Duration::from_millis(10),
        detail_interval: Duration::from_millis(10),
        heartbeat_interval: Duration::from_millis(10),
        failure_notice_after: 5,
    }
}

fn next_matching(
    engine: &EngineHandle,
    mut accept: impl FnMut(&EngineEvent) -> bool,
) -> Option<EngineEvent> {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if let Some(event) = engine.recv_timeout(Duration::from_millis(50)) {
            if accept(&event) {
                return Some(event);
            }
        }
    }
    None
}

#[test]
fn trigger_then_poll_reports_progress_and_completion() {
    curator_logging::initialize_for_tests();
    let api = FakeApi::default();
    {
        let mut scan = api.scan.lock().unwrap();
        scan.push_back(ScanStatus {
            running: true,
            progress: 10.0,
            ..ScanStatus::default()
        });
        scan.push_back(ScanStatus {
            running: false,
            progress: 100.0,
            message: None,
            result: Some(ScanResult {
                episodes_matched: 7,
                ..ScanResult::default()
            }),
        });
    }
    let engine = EngineHandle::with_api(Arc::new(api), fast_settings()).expect("engine");

    assert!(engine.send(EngineCommand::TriggerScan(ScanKind::Full)));
    let triggered = next_matching(&engine, |e| matches!(e, EngineEvent::JobTriggered { .. }));
    assert_eq!(
        triggered,
        Some(EngineEvent::JobTriggered {
            kind: JobKind::Scan,
            result: Ok(()),
        })
    );

    engine.send(EngineCommand::StartPolling(JobKind::Scan));
    let polled = next_matching(&engine, |e| matches!(e, EngineEvent::JobPolled(_)));
    assert!(matches!(
        polled,
        Some(EngineEvent::JobPolled(JobReport::Scan(s))) if s.progress == 10.0
    ));
    let finished = next_matching(&engine, |e| matches!(e, EngineEvent::JobFinished(_)));
    match finished {
        Some(EngineEvent::JobFinished(JobReport::Scan(status))) => {
            assert_eq!(status.result.map(|r| r.episodes_matched), Some(7));
        }
        other => panic!("unexpected event {other:?}"),
    }
    engine.shutdown();
}

#[test]
fn trigger_failure_is_reported() {
    curator_logging::initialize_for_tests();
    let api = FakeApi {
        refresh_fails: true,
        ..FakeApi::default()
    };
    let engine = EngineHandle::with_api(Arc::new(api), fast_settings()).expect("engine");

    engine.send(EngineCommand::TriggerRefreshAll);
    let event = next_matching(&engine, |e| matches!(e, EngineEvent::JobTriggered { .. }));
    match event {
        Some(EngineEvent::JobTriggered { kind, result }) => {
            assert_eq!(kind, JobKind::RefreshAll);
            assert_eq!(result.unwrap_err().kind, FailureKind::HttpStatus(409));
        }
        other => panic!("unexpected event {other:?}"),
    }
    engine.shutdown();
}

#[test]
fn status_read_is_tagged_with_kind() {
    curator_logging::initialize_for_tests();
    let engine = EngineHandle::with_api(Arc::new(FakeApi::default()), fast_settings())
        .expect("engine");

    engine.send(EngineCommand::ReadStatus(JobKind::RefreshAll));
    let event = next_matching(&engine, |e| matches!(e, EngineEvent::StatusRead { .. }));
    match event {
        Some(EngineEvent::StatusRead { kind, result }) => {
            assert_eq!(kind, JobKind::RefreshAll);
            assert!(matches!(result, Ok(JobReport::RefreshAll(s)) if s.running && s.total == 4));
        }
        other => panic!("unexpected event {other:?}"),
    }
    engine.shutdown();
}

#[test]
fn indicator_ticker_reports_watcher_status() {
    curator_logging::initialize_for_tests();
    let engine = EngineHandle::with_api(Arc::new(FakeApi::default()), fast_settings())
        .expect("engine");

    engine.send(EngineCommand::StartTicker(Ticker::WatcherIndicator));
    let event = next_matching(&engine, |e| {
        matches!(
            e,
            EngineEvent::WatcherStatus {
                source: WatcherSource::Indicator,
                ..
            }
        )
    });
    assert!(matches!(
        event,
        Some(EngineEvent::WatcherStatus {
            result: Ok(ref s),
            ..
        }) if s.status == WatcherState::Paused
    ));

    engine.send(EngineCommand::WatcherCommand(WatcherCommand::Start));
    let event = next_matching(&engine, |e| {
        matches!(
            e,
            EngineEvent::WatcherStatus {
                source: WatcherSource::Command,
                ..
            }
        )
    });
    assert!(matches!(
        event,
        Some(EngineEvent::WatcherStatus {
            result: Ok(ref s),
            ..
        }) if s.status == WatcherState::Running
    ));
    engine.shutdown();
}

#[test]
fn selected_scan_and_section_save_round_trip() {
    curator_logging::initialize_for_tests();
    let engine = EngineHandle::with_api(Arc::new(FakeApi::default()), fast_settings())
        .expect("engine");

    engine.send(EngineCommand::ScanEpisodes(vec![1, 2, 3]));
    let event = next_matching(&engine, |e| matches!(e, EngineEvent::SelectedScanFinished(_)));
    assert!(matches!(
        event,
        Some(EngineEvent::SelectedScanFinished(Ok(ref r))) if r.episodes_matched == 3
    ));

    engine.send(EngineCommand::SaveSection {
        section: SettingsSection::Metadata,
        draft: serde_json::json!({ "language": "en" }),
    });
    let event = next_matching(&engine, |e| matches!(e, EngineEvent::SectionSaved { .. }));
    assert_eq!(
        event,
        Some(EngineEvent::SectionSaved {
            section: SettingsSection::Metadata,
            result: Ok(()),
        })
    );
    engine.shutdown();
}

#[test]
fn stop_all_ends_the_engine() {
    curator_logging::initialize_for_tests();
    let engine = EngineHandle::with_api(Arc::new(FakeApi::default()), fast_settings())
        .expect("engine");
    engine.send(EngineCommand::StartPolling(JobKind::RefreshAll));
    engine.send(EngineCommand::StartTicker(Ticker::Heartbeat));
    // Joins the engine thread; hangs if a loop kept it alive.
    engine.shutdown();
}
