use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context};
use curator_engine::{ClientSettings, EngineSettings, PollSettings};
use log::LevelFilter;
use serde::{Deserialize, Serialize};

use super::logging::LogDestination;

pub const DEFAULT_CONFIG_PATH: &str = "curator.ron";
pub const SERVER_URL_ENV: &str = "CURATOR_SERVER_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub server_url: String,
    pub log_level: String,
    pub log_destination: LogDestination,
    pub state_dir: PathBuf,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub scan_poll_ms: u64,
    pub refresh_poll_ms: u64,
    pub import_poll_ms: u64,
    pub indicator_poll_ms: u64,
    pub detail_poll_ms: u64,
    pub heartbeat_ms: u64,
    pub failure_notice_after: u32,
    /// Shows per import batch when neither the command nor the saved
    /// preferences name one.
    pub import_batch_limit: u32,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:3000".to_string(),
            log_level: "info".to_string(),
            log_destination: LogDestination::default(),
            state_dir: PathBuf::from(".curator"),
            connect_timeout_ms: 5_000,
            request_timeout_ms: 15_000,
            scan_poll_ms: 1_000,
            refresh_poll_ms: 2_000,
            import_poll_ms: 1_000,
            indicator_poll_ms: 15_000,
            detail_poll_ms: 5_000,
            heartbeat_ms: 30_000,
            failure_notice_after: 5,
            import_batch_limit: 10,
        }
    }
}

impl PanelConfig {
    /// Reads a RON config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        match fs::read_to_string(path) {
            Ok(text) => Self::parse(&text),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(err).context("reading config file"),
        }
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        ron::from_str(text).context("parsing config")
    }

    pub fn with_env_overrides(self) -> Self {
        self.with_server_url(std::env::var(SERVER_URL_ENV).ok())
    }

    fn with_server_url(mut self, server_url: Option<String>) -> Self {
        if let Some(url) = server_url.filter(|url| !url.trim().is_empty()) {
            self.server_url = url.trim().to_string();
        }
        self
    }

    pub fn level_filter(&self) -> anyhow::Result<LevelFilter> {
        LevelFilter::from_str(&self.log_level)
            .map_err(|_| anyhow!("unknown log level {:?}", self.log_level))
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            client: ClientSettings {
                base_url: self.server_url.clone(),
                connect_timeout: Duration::from_millis(self.connect_timeout_ms),
                request_timeout: Duration::from_millis(self.request_timeout_ms),
            },
            poll: PollSettings {
                scan_interval: Duration::from_millis(self.scan_poll_ms),
                refresh_interval: Duration::from_millis(self.refresh_poll_ms),
                import_interval: Duration::from_millis(self.import_poll_ms),
                indicator_interval: Duration::from_millis(self.indicator_poll_ms),
                detail_interval: Duration::from_millis(self.detail_poll_ms),
                heartbeat_interval: Duration::from_millis(self.heartbeat_ms),
                failure_notice_after: self.failure_notice_after,
            },
        }
    }
}
