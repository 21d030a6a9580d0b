use std::future::Future;
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use curator_core::{
    EpisodeId, JobKind, JobReport, ScanKind, SettingsSection, Ticker, WatcherCommand,
    WatcherSource,
};
use curator_logging::{curator_debug, curator_info, curator_warn};

use crate::api::{fetch_report, ClientSettings, LibraryApi, ReqwestLibraryApi};
use crate::poller::{PollObserver, PollSettings, Poller};
use crate::ticker::Tickers;
use crate::{ApiError, EngineError, EngineEvent};

#[derive(Debug, Clone, Default)]
pub struct EngineSettings {
    pub client: ClientSettings,
    pub poll: PollSettings,
}

/// Work the engine thread accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCommand {
    TriggerScan(ScanKind),
    ScanEpisodes(Vec<EpisodeId>),
    TriggerRefreshAll,
    StartImport { folder: String, limit: u32 },
    StartPolling(JobKind),
    ReadStatus(JobKind),
    StartTicker(Ticker),
    StopTicker(Ticker),
    FetchWatcherStatus(WatcherSource),
    SendHeartbeat,
    WatcherCommand(WatcherCommand),
    SaveSection {
        section: SettingsSection,
        draft: serde_json::Value,
    },
    /// Cancels every loop and ends the engine thread.
    StopAll,
}

/// Runs commands on a background tokio runtime and hands results back as
/// [`EngineEvent`]s.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    thread: Option<JoinHandle<()>>,
}

impl EngineHandle {
    pub fn new(settings: EngineSettings) -> Result<Self, EngineError> {
        let api = ReqwestLibraryApi::new(&settings.client)?;
        Self::with_api(Arc::new(api), settings.poll)
    }

    pub fn with_api(api: Arc<dyn LibraryApi>, poll: PollSettings) -> Result<Self, EngineError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("curator-io")
            .enable_all()
            .build()?;
        let (cmd_tx, cmd_rx) = mpsc::channel::<EngineCommand>();
        let (event_tx, event_rx) = mpsc::channel();

        let thread = thread::Builder::new()
            .name("curator-engine".to_string())
            .spawn(move || {
                let _entered = runtime.enter();
                let context = Context {
                    api,
                    poller: Poller::new(poll.failure_notice_after),
                    tickers: Tickers::new(),
                    settings: poll,
                    events: event_tx,
                };
                while let Ok(command) = cmd_rx.recv() {
                    let last = matches!(command, EngineCommand::StopAll);
                    context.handle(command);
                    if last {
                        break;
                    }
                }
                context.stop_all();
                curator_debug!("Engine thread exiting");
            })?;

        Ok(Self {
            cmd_tx,
            event_rx,
            thread: Some(thread),
        })
    }

    /// Queues `command`. Returns false once the engine has stopped.
    pub fn send(&self, command: EngineCommand) -> bool {
        self.cmd_tx.send(command).is_ok()
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    /// Stops every loop and waits for the engine thread to exit.
    pub fn shutdown(mut self) {
        let _ = self.cmd_tx.send(EngineCommand::StopAll);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                curator_warn!("Engine thread panicked during shutdown");
            }
        }
    }
}

struct Context {
    api: Arc<dyn LibraryApi>,
    poller: Poller,
    tickers: Tickers,
    settings: PollSettings,
    events: mpsc::Sender<EngineEvent>,
}

impl Context {
    fn handle(&self, command: EngineCommand) {
        curator_debug!("Engine command {:?}", command);
        match command {
            EngineCommand::TriggerScan(kind) => self.request(move |api| async move {
                EngineEvent::JobTriggered {
                    kind: JobKind::Scan,
                    result: api.trigger_scan(kind).await,
                }
            }),
            EngineCommand::ScanEpisodes(episodes) => self.request(move |api| async move {
                EngineEvent::SelectedScanFinished(api.scan_episodes(&episodes).await)
            }),
            EngineCommand::TriggerRefreshAll => self.request(|api| async move {
                EngineEvent::JobTriggered {
                    kind: JobKind::RefreshAll,
                    result: api.trigger_refresh_all().await,
                }
            }),
            EngineCommand::StartImport { folder, limit } => {
                self.request(move |api| async move {
                    EngineEvent::JobTriggered {
                        kind: JobKind::LibraryImport,
                        result: api.start_library_import(&folder, limit).await,
                    }
                })
            }
            EngineCommand::StartPolling(kind) => self.start_polling(kind),
            EngineCommand::ReadStatus(kind) => self.request(move |api| async move {
                EngineEvent::StatusRead {
                    kind,
                    result: fetch_report(api.as_ref(), kind).await,
                }
            }),
            EngineCommand::StartTicker(ticker) => self.start_ticker(ticker),
            EngineCommand::StopTicker(ticker) => {
                self.tickers.stop(ticker);
            }
            EngineCommand::FetchWatcherStatus(source) => {
                self.request(move |api| watcher_read(api, source))
            }
            EngineCommand::SendHeartbeat => {
                self.request(|api| watcher_read(api, WatcherSource::Heartbeat))
            }
            EngineCommand::WatcherCommand(command) => self.request(move |api| async move {
                EngineEvent::WatcherStatus {
                    source: WatcherSource::Command,
                    result: api.watcher_command(command).await,
                }
            }),
            EngineCommand::SaveSection { section, draft } => {
                self.request(move |api| async move {
                    EngineEvent::SectionSaved {
                        section,
                        result: api.save_settings(section, &draft).await,
                    }
                })
            }
            EngineCommand::StopAll => self.stop_all(),
        }
    }

    /// Runs a one-shot request and forwards its event.
    fn request<F, Fut>(&self, request: F)
    where
        F: FnOnce(Arc<dyn LibraryApi>) -> Fut,
        Fut: Future<Output = EngineEvent> + Send + 'static,
    {
        let pending = request(Arc::clone(&self.api));
        let events = self.events.clone();
        tokio::spawn(async move {
            let _ = events.send(pending.await);
        });
    }

    fn start_polling(&self, kind: JobKind) {
        let interval = self.settings.interval(kind);
        let api = Arc::clone(&self.api);
        let events = self.events.clone();
        match kind {
            JobKind::Scan => {
                self.poller.start(
                    kind,
                    interval,
                    move || {
                        let api = Arc::clone(&api);
                        async move { api.scan_status().await }
                    },
                    ReportSink::new(kind, JobReport::Scan, events),
                );
            }
            JobKind::RefreshAll => {
                self.poller.start(
                    kind,
                    interval,
                    move || {
                        let api = Arc::clone(&api);
                        async move { api.refresh_status().await }
                    },
                    ReportSink::new(kind, JobReport::RefreshAll, events),
                );
            }
            JobKind::LibraryImport => {
                self.poller.start(
                    kind,
                    interval,
                    move || {
                        let api = Arc::clone(&api);
                        async move { api.library_import_status().await }
                    },
                    ReportSink::new(kind, JobReport::LibraryImport, events),
                );
            }
        }
    }

    fn start_ticker(&self, ticker: Ticker) {
        let source = match ticker {
            Ticker::WatcherIndicator => WatcherSource::Indicator,
            Ticker::WatcherDetail => WatcherSource::Detail,
            Ticker::Heartbeat => WatcherSource::Heartbeat,
        };
        let api = Arc::clone(&self.api);
        let events = self.events.clone();
        self.tickers
            .start(ticker, self.settings.period(ticker), move || {
                let api = Arc::clone(&api);
                let events = events.clone();
                async move {
                    let _ = events.send(watcher_read(api, source).await);
                }
            });
    }

    fn stop_all(&self) {
        let pollers = self.poller.shutdown();
        let tickers = self.tickers.shutdown();
        if pollers + tickers > 0 {
            curator_info!("Stopped {} poller(s) and {} ticker(s)", pollers, tickers);
        }
    }
}

async fn watcher_read(api: Arc<dyn LibraryApi>, source: WatcherSource) -> EngineEvent {
    let result = match source {
        WatcherSource::Heartbeat => api.heartbeat().await,
        _ => api.watcher_status().await,
    };
    EngineEvent::WatcherStatus { source, result }
}

/// Forwards a poller's observations as engine events.
struct ReportSink<T> {
    kind: JobKind,
    wrap: fn(T) -> JobReport,
    events: mpsc::Sender<EngineEvent>,
}

impl<T> ReportSink<T> {
    fn new(kind: JobKind, wrap: fn(T) -> JobReport, events: mpsc::Sender<EngineEvent>) -> Self {
        Self { kind, wrap, events }
    }
}

impl<T: Clone + Send + 'static> PollObserver<T> for ReportSink<T> {
    fn tick(&self, status: &T) {
        let _ = self
            .events
            .send(EngineEvent::JobPolled((self.wrap)(status.clone())));
    }

    fn complete(&self, status: T) {
        let _ = self.events.send(EngineEvent::JobFinished((self.wrap)(status)));
    }

    fn failing(&self, attempts: u32, error: &ApiError) {
        let _ = self.events.send(EngineEvent::PollFailing {
            kind: self.kind,
            attempts,
            error: error.clone(),
        });
    }

    fn recovered(&self) {
        let _ = self.events.send(EngineEvent::PollRecovered { kind: self.kind });
    }
}
