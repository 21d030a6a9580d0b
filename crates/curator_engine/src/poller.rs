use std::future::Future;
use std::time::Duration;

use curator_core::{JobKind, JobStatus, Ticker};
use curator_logging::{curator_debug, curator_info, curator_warn};

use crate::tasks::TaskRegistry;
use crate::ApiError;

#[derive(Debug, Clone)]
pub struct PollSettings {
    pub scan_interval: Duration,
    pub refresh_interval: Duration,
    pub import_interval: Duration,
    pub indicator_interval: Duration,
    pub detail_interval: Duration,
    pub heartbeat_interval: Duration,
    /// Consecutive failed fetches before the loop reports itself failing.
    pub failure_notice_after: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            scan_interval: Duration::from_millis(1000),
            refresh_interval: Duration::from_millis(2000),
            import_interval: Duration::from_millis(1000),
            indicator_interval: Duration::from_secs(15),
            detail_interval: Duration::from_secs(5),
            heartbeat_interval: Duration::from_secs(30),
            failure_notice_after: 5,
        }
    }
}

impl PollSettings {
    pub fn interval(&self, kind: JobKind) -> Duration {
        match kind {
            JobKind::Scan => self.scan_interval,
            JobKind::RefreshAll => self.refresh_interval,
            JobKind::LibraryImport => self.import_interval,
        }
    }

    pub fn period(&self, ticker: Ticker) -> Duration {
        match ticker {
            Ticker::WatcherIndicator => self.indicator_interval,
            Ticker::WatcherDetail => self.detail_interval,
            Ticker::Heartbeat => self.heartbeat_interval,
        }
    }
}

/// Receives what a polling loop observes. Calls come from the loop's task
/// and must not block.
pub trait PollObserver<T>: Send + Sync + 'static {
    /// A fetch returned a still-running status.
    fn tick(&self, status: &T);

    /// A fetch returned a terminal status. Called once; the loop has already
    /// been deregistered.
    fn complete(&self, status: T);

    fn failing(&self, attempts: u32, error: &ApiError);

    fn recovered(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollHandle {
    kind: JobKind,
    generation: u64,
}

impl PollHandle {
    pub fn kind(&self) -> JobKind {
        self.kind
    }
}

/// Polling loops keyed by job kind.
#[derive(Clone)]
pub struct Poller {
    registry: TaskRegistry<JobKind>,
    failure_notice_after: u32,
}

impl Poller {
    pub fn new(failure_notice_after: u32) -> Self {
        Self {
            registry: TaskRegistry::new(),
            failure_notice_after: failure_notice_after.max(1),
        }
    }

    /// Starts polling `kind` every `interval`. If a loop for `kind` is
    /// already live its handle is returned and nothing new is spawned.
    ///
    /// The first fetch happens one interval after the call. Must be called
    /// from within a tokio runtime.
    pub fn start<T, F, Fut, O>(
        &self,
        kind: JobKind,
        interval: Duration,
        fetch: F,
        observer: O,
    ) -> PollHandle
    where
        T: JobStatus + Send + 'static,
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
        O: PollObserver<T>,
    {
        let (generation, token) = match self.registry.claim(kind) {
            Ok(claimed) => claimed,
            Err(generation) => {
                curator_debug!("Poller for {} already active", kind.label());
                return PollHandle { kind, generation };
            }
        };
        curator_debug!(
            "Poller for {} started every {}ms",
            kind.label(),
            interval.as_millis()
        );

        let registry = self.registry.clone();
        let threshold = self.failure_notice_after;
        tokio::spawn(async move {
            let mut failures: u32 = 0;
            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        curator_debug!("Poller for {} stopped", kind.label());
                        return;
                    }
                    _ = tokio::time::sleep(interval) => {}
                }

                // An in-flight fetch is never interrupted; its result is
                // dropped if the loop was stopped meanwhile.
                let result = fetch().await;
                if token.is_cancelled() {
                    return;
                }

                match result {
                    Ok(status) => {
                        if failures >= threshold {
                            curator_info!(
                                "Poller for {} recovered after {} failures",
                                kind.label(),
                                failures
                            );
                            observer.recovered();
                        }
                        failures = 0;
                        if status.is_running() {
                            observer.tick(&status);
                        } else {
                            registry.release(kind, generation);
                            curator_info!("Poller for {} saw completion", kind.label());
                            observer.complete(status);
                            return;
                        }
                    }
                    Err(err) => {
                        failures = failures.saturating_add(1);
                        curator_warn!(
                            "Poller for {} fetch failed ({} in a row): {}",
                            kind.label(),
                            failures,
                            err
                        );
                        if failures == threshold {
                            observer.failing(failures, &err);
                        }
                    }
                }
            }
        });

        PollHandle { kind, generation }
    }

    /// Stops the loop behind `handle`. Safe on handles that already ended.
    pub fn stop(&self, handle: PollHandle) -> bool {
        self.registry.cancel(handle.kind, Some(handle.generation))
    }

    pub fn is_active(&self, kind: JobKind) -> bool {
        self.registry.generation(kind).is_some()
    }

    pub fn active_count(&self) -> usize {
        self.registry.len()
    }

    pub fn shutdown(&self) -> usize {
        self.registry.cancel_all()
    }
}
