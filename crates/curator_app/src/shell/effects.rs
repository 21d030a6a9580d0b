use std::collections::BTreeMap;

use curator_core::{
    Destination, Effect, FocusTarget, Msg, Notice, NoticeLevel, ReloadScope, SettingsSection,
};
use curator_engine::{EngineCommand, EngineEvent, EngineHandle, KeyValueStore};
use curator_logging::{curator_debug, curator_info, curator_warn};

use super::persistence;

type Draft = serde_json::Map<String, serde_json::Value>;

/// Executes effects: engine work goes to the engine thread, everything the
/// operator should see comes back as console lines.
pub struct EffectRunner {
    engine: EngineHandle,
    store: Box<dyn KeyValueStore>,
    drafts: BTreeMap<SettingsSection, Draft>,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, store: Box<dyn KeyValueStore>) -> Self {
        Self {
            engine,
            store,
            drafts: BTreeMap::new(),
        }
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub fn edit(&mut self, section: SettingsSection, key: String, value: serde_json::Value) {
        self.drafts.entry(section).or_default().insert(key, value);
    }

    pub fn clear_draft(&mut self, section: SettingsSection) {
        self.drafts.remove(&section);
    }

    pub fn run(&mut self, effects: Vec<Effect>) -> Vec<String> {
        let mut lines = Vec::new();
        for effect in effects {
            curator_info!("Effect {:?}", effect);
            if let Some(line) = self.run_one(effect) {
                lines.push(line);
            }
        }
        lines
    }

    fn run_one(&mut self, effect: Effect) -> Option<String> {
        let command = match effect {
            Effect::TriggerScan(kind) => EngineCommand::TriggerScan(kind),
            Effect::ScanEpisodes(episodes) => EngineCommand::ScanEpisodes(episodes),
            Effect::TriggerRefreshAll => EngineCommand::TriggerRefreshAll,
            Effect::StartImport { folder, limit } => EngineCommand::StartImport { folder, limit },
            Effect::StartPolling(kind) => EngineCommand::StartPolling(kind),
            Effect::ReadStatus(kind) => EngineCommand::ReadStatus(kind),
            Effect::StartTicker(ticker) => EngineCommand::StartTicker(ticker),
            Effect::StopTicker(ticker) => EngineCommand::StopTicker(ticker),
            Effect::FetchWatcherStatus(source) => EngineCommand::FetchWatcherStatus(source),
            Effect::SendHeartbeat => EngineCommand::SendHeartbeat,
            Effect::WatcherCommand(command) => EngineCommand::WatcherCommand(command),
            Effect::SaveSection(section) => EngineCommand::SaveSection {
                section,
                draft: serde_json::Value::Object(
                    self.drafts.get(&section).cloned().unwrap_or_default(),
                ),
            },
            Effect::StopAll => EngineCommand::StopAll,
            Effect::DiscardSection(section) => {
                self.drafts.remove(&section);
                return Some(format!("Discarded changes to {} settings", section.as_str()));
            }
            Effect::SavePreferences(preferences) => {
                persistence::save_preferences(self.store.as_mut(), &preferences);
                return None;
            }
            Effect::PromptUnsaved {
                section,
                destination,
            } => {
                return Some(format!(
                    "Unsaved changes in {} settings before {}. choose save | discard | cancel",
                    section.as_str(),
                    describe_destination(destination)
                ));
            }
            Effect::Notify(notice) => return Some(format_notice(&notice)),
            Effect::Focus(target) => {
                return Some(
                    match target {
                        FocusTarget::EpisodeSelection => {
                            "Select one or more episodes first (scan-selected <id> ...)"
                        }
                        FocusTarget::ImportFolder => {
                            "Enter an import folder and a limit above zero: import <folder> <limit>"
                        }
                    }
                    .to_string(),
                );
            }
            Effect::Reload(scope) => {
                // The headless shell has no page data of its own to refetch.
                curator_debug!(
                    "Reload {}",
                    match scope {
                        ReloadScope::CurrentPage => "current page",
                        ReloadScope::Shows => "shows",
                    }
                );
                return None;
            }
        };
        if !self.engine.send(command) {
            curator_warn!("Engine stopped; command dropped");
        }
        None
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.engine.try_recv()
    }

    pub fn into_engine(self) -> EngineHandle {
        self.engine
    }
}

/// Maps an engine result to the message the core expects. Failed status
/// reads have no message; the next read or poll supersedes them.
pub fn event_to_msg(event: EngineEvent) -> Option<Msg> {
    let msg = match event {
        EngineEvent::JobTriggered { kind, result } => Msg::JobTriggered {
            kind,
            result: result.map_err(|err| err.to_string()),
        },
        EngineEvent::JobPolled(report) => Msg::JobPolled(report),
        EngineEvent::JobFinished(report) => Msg::JobFinished(report),
        EngineEvent::StatusRead { kind, result } => match result {
            Ok(report) => Msg::StatusRead(report),
            Err(err) => {
                curator_warn!("Status read for {} failed: {}", kind.label(), err);
                return None;
            }
        },
        EngineEvent::PollFailing {
            kind,
            attempts,
            error,
        } => Msg::PollFailing {
            kind,
            attempts,
            message: error.to_string(),
        },
        EngineEvent::PollRecovered { kind } => Msg::PollRecovered { kind },
        EngineEvent::SelectedScanFinished(result) => {
            Msg::SelectedScanFinished(result.map_err(|err| err.to_string()))
        }
        EngineEvent::WatcherStatus { source, result } => Msg::WatcherStatusReceived {
            source,
            result: result.map_err(|err| err.to_string()),
        },
        EngineEvent::SectionSaved { section, result } => Msg::SectionSaveFinished {
            section,
            result: result.map_err(|err| err.to_string()),
        },
    };
    Some(msg)
}

pub(crate) fn format_notice(notice: &Notice) -> String {
    let tag = match notice.level {
        NoticeLevel::Info => "info",
        NoticeLevel::Success => "ok",
        NoticeLevel::Warning => "warn",
        NoticeLevel::Error => "error",
    };
    format!("[{tag}] {}", notice.text)
}

fn describe_destination(destination: Destination) -> String {
    match destination {
        Destination::Page(page) => format!("leaving for {page:?}").to_lowercase(),
        Destination::Tab(section) => format!("switching to the {} tab", section.as_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curator_core::{JobKind, WatcherSource};
    use curator_engine::{ApiError, FailureKind};
    use pretty_assertions::assert_eq;

    fn error(kind: FailureKind, message: &str) -> ApiError {
        ApiError {
            kind,
            message: message.to_string(),
        }
    }

    #[test]
    fn trigger_errors_become_strings() {
        let msg = event_to_msg(EngineEvent::JobTriggered {
            kind: JobKind::Scan,
            result: Err(error(FailureKind::HttpStatus(409), "scan already running")),
        });
        assert_eq!(
            msg,
            Some(Msg::JobTriggered {
                kind: JobKind::Scan,
                result: Err("http status 409: scan already running".to_string()),
            })
        );
    }

    #[test]
    fn failed_status_read_is_dropped() {
        let msg = event_to_msg(EngineEvent::StatusRead {
            kind: JobKind::RefreshAll,
            result: Err(error(FailureKind::Timeout, "deadline")),
        });
        assert_eq!(msg, None);
    }

    #[test]
    fn watcher_failures_keep_their_source() {
        let msg = event_to_msg(EngineEvent::WatcherStatus {
            source: WatcherSource::Heartbeat,
            result: Err(error(FailureKind::Network, "refused")),
        });
        assert!(matches!(
            msg,
            Some(Msg::WatcherStatusReceived {
                source: WatcherSource::Heartbeat,
                result: Err(_),
            })
        ));
    }

    #[test]
    fn notices_are_tagged_by_level() {
        assert_eq!(
            format_notice(&Notice::warning("Lost contact")),
            "[warn] Lost contact"
        );
        assert_eq!(
            describe_destination(Destination::Page(curator_core::Page::Shows)),
            "leaving for shows"
        );
    }
}
