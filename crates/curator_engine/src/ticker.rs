use std::future::Future;
use std::time::Duration;

use curator_core::Ticker;
use curator_logging::curator_debug;

use crate::tasks::TaskRegistry;

/// Fixed-period background tasks for the watcher cadences.
#[derive(Clone)]
pub struct Tickers {
    registry: TaskRegistry<Ticker>,
}

impl Default for Tickers {
    fn default() -> Self {
        Self::new()
    }
}

impl Tickers {
    pub fn new() -> Self {
        Self {
            registry: TaskRegistry::new(),
        }
    }

    /// Runs `tick` every `period` until stopped, first after one period.
    /// Returns false if `ticker` was already running.
    pub fn start<F, Fut>(&self, ticker: Ticker, period: Duration, tick: F) -> bool
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let Ok((_generation, token)) = self.registry.claim(ticker) else {
            return false;
        };
        curator_debug!("Ticker {:?} started every {}ms", ticker, period.as_millis());
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => return,
                    _ = tokio::time::sleep(period) => {}
                }
                tick().await;
            }
        });
        true
    }

    pub fn stop(&self, ticker: Ticker) -> bool {
        let stopped = self.registry.cancel(ticker, None);
        if stopped {
            curator_debug!("Ticker {:?} stopped", ticker);
        }
        stopped
    }

    pub fn is_active(&self, ticker: Ticker) -> bool {
        self.registry.generation(ticker).is_some()
    }

    pub fn shutdown(&self) -> usize {
        self.registry.cancel_all()
    }
}
