use std::time::Duration;

use curator_core::{
    EpisodeId, JobKind, JobReport, LibraryImportStatus, RefreshStatus, ScanKind, ScanResult,
    ScanStatus, SettingsSection, WatcherCommand, WatcherStatus,
};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::json;
use url::Url;

use crate::{ApiError, FailureKind};

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(15),
        }
    }
}

/// The control-panel API the engine drives. Triggers return as soon as the
/// server accepts the job; progress is observed through the status calls.
#[async_trait::async_trait]
pub trait LibraryApi: Send + Sync {
    async fn trigger_scan(&self, kind: ScanKind) -> Result<(), ApiError>;

    /// Scans the given episodes inline and returns the server's result.
    async fn scan_episodes(&self, episodes: &[EpisodeId]) -> Result<ScanResult, ApiError>;

    async fn scan_status(&self) -> Result<ScanStatus, ApiError>;

    async fn trigger_refresh_all(&self) -> Result<(), ApiError>;

    async fn refresh_status(&self) -> Result<RefreshStatus, ApiError>;

    async fn start_library_import(&self, folder: &str, limit: u32) -> Result<(), ApiError>;

    async fn library_import_status(&self) -> Result<LibraryImportStatus, ApiError>;

    async fn watcher_status(&self) -> Result<WatcherStatus, ApiError>;

    async fn watcher_command(&self, command: WatcherCommand) -> Result<WatcherStatus, ApiError>;

    async fn heartbeat(&self) -> Result<WatcherStatus, ApiError>;

    async fn save_settings(
        &self,
        section: SettingsSection,
        draft: &serde_json::Value,
    ) -> Result<(), ApiError>;
}

/// Reads the status of `kind` and tags it.
pub async fn fetch_report(api: &dyn LibraryApi, kind: JobKind) -> Result<JobReport, ApiError> {
    match kind {
        JobKind::Scan => api.scan_status().await.map(JobReport::Scan),
        JobKind::RefreshAll => api.refresh_status().await.map(JobReport::RefreshAll),
        JobKind::LibraryImport => api
            .library_import_status()
            .await
            .map(JobReport::LibraryImport),
    }
}

#[derive(Debug, Clone)]
pub struct ReqwestLibraryApi {
    base: Url,
    client: reqwest::Client,
}

impl ReqwestLibraryApi {
    pub fn new(settings: &ClientSettings) -> Result<Self, ApiError> {
        let mut base = Url::parse(&settings.base_url)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::new(
                FailureKind::InvalidUrl,
                format!("{} cannot be used as a base url", settings.base_url),
            ));
        }
        // Url::join drops the last segment unless the path ends in a slash.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self { base, client })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<Vec<u8>, ApiError> {
        let url = self.endpoint(path)?;
        let mut request = self
            .client
            .request(method, url)
            .header(ACCEPT, "application/json");
        if let Some(body) = body {
            let bytes = serde_json::to_vec(&body)
                .map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))?;
            request = request.header(CONTENT_TYPE, "application/json").body(bytes);
        }

        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        if !status.is_success() {
            return Err(ApiError::new(
                FailureKind::HttpStatus(status.as_u16()),
                server_message(&bytes).unwrap_or_else(|| status.to_string()),
            ));
        }
        Ok(bytes.to_vec())
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let bytes = self.send(Method::GET, path, None).await?;
        decode(&bytes)
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T, ApiError> {
        let bytes = self.send(Method::POST, path, body).await?;
        decode(&bytes)
    }
}

#[async_trait::async_trait]
impl LibraryApi for ReqwestLibraryApi {
    async fn trigger_scan(&self, kind: ScanKind) -> Result<(), ApiError> {
        self.send(Method::POST, "api/scan", Some(json!({ "type": kind.as_str() })))
            .await
            .map(drop)
    }

    async fn scan_episodes(&self, episodes: &[EpisodeId]) -> Result<ScanResult, ApiError> {
        self.post_json("api/scan/episodes", Some(json!({ "episodeIds": episodes })))
            .await
    }

    async fn scan_status(&self) -> Result<ScanStatus, ApiError> {
        self.get_json("api/scan/status").await
    }

    async fn trigger_refresh_all(&self) -> Result<(), ApiError> {
        self.send(Method::POST, "api/metadata/refresh-all", None)
            .await
            .map(drop)
    }

    async fn refresh_status(&self) -> Result<RefreshStatus, ApiError> {
        self.get_json("api/metadata/refresh-all/status").await
    }

    async fn start_library_import(&self, folder: &str, limit: u32) -> Result<(), ApiError> {
        self.send(
            Method::POST,
            "api/library/import",
            Some(json!({ "folder": folder, "limit": limit })),
        )
        .await
        .map(drop)
    }

    async fn library_import_status(&self) -> Result<LibraryImportStatus, ApiError> {
        self.get_json("api/library/import/status").await
    }

    async fn watcher_status(&self) -> Result<WatcherStatus, ApiError> {
        self.get_json("api/watcher/status").await
    }

    async fn watcher_command(&self, command: WatcherCommand) -> Result<WatcherStatus, ApiError> {
        let path = match command {
            WatcherCommand::Start => "api/watcher/start",
            WatcherCommand::Stop => "api/watcher/stop",
        };
        self.post_json(path, None).await
    }

    async fn heartbeat(&self) -> Result<WatcherStatus, ApiError> {
        self.post_json("api/watcher/heartbeat", None).await
    }

    async fn save_settings(
        &self,
        section: SettingsSection,
        draft: &serde_json::Value,
    ) -> Result<(), ApiError> {
        let path = format!("api/settings/{}", section.as_str());
        self.send(Method::PUT, &path, Some(draft.clone()))
            .await
            .map(drop)
    }
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(bytes).map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))
}

/// Pulls `{"error": "..."}` out of a failed response body.
fn server_message(bytes: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(bytes).ok()?;
    value
        .get("error")
        .and_then(|error| error.as_str())
        .map(str::to_string)
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_without_trailing_slash_keeps_its_path() {
        let api = ReqwestLibraryApi::new(&ClientSettings {
            base_url: "http://localhost:8080/panel".to_string(),
            ..ClientSettings::default()
        })
        .unwrap();
        let url = api.endpoint("api/scan/status").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/panel/api/scan/status");
    }

    #[test]
    fn rejects_unparseable_base() {
        let err = ReqwestLibraryApi::new(&ClientSettings {
            base_url: "not a url".to_string(),
            ..ClientSettings::default()
        })
        .unwrap_err();
        assert_eq!(err.kind, FailureKind::InvalidUrl);
    }

    #[test]
    fn lifts_server_error_message() {
        assert_eq!(
            server_message(br#"{"error":"scan already running"}"#),
            Some("scan already running".to_string())
        );
        assert_eq!(server_message(b"<html>oops</html>"), None);
    }
}
