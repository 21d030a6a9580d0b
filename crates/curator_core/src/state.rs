use serde::{Deserialize, Serialize};

use crate::guard::NavigationGuard;
use crate::import::ImportState;
use crate::refresh::RefreshState;
use crate::scan::ScanState;
use crate::view_model::AppViewModel;
use crate::watcher::WatcherMonitor;
use crate::Observers;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    #[default]
    Dashboard,
    Shows,
    Import,
    Watcher,
    Settings,
    Logs,
}

/// Editable settings sections. Each owns one dirty flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingsSection {
    #[default]
    General,
    Formats,
    Metadata,
    Notifications,
    /// Watcher configuration, edited on the watcher page.
    Watcher,
}

impl SettingsSection {
    pub fn as_str(self) -> &'static str {
        match self {
            SettingsSection::General => "general",
            SettingsSection::Formats => "formats",
            SettingsSection::Metadata => "metadata",
            SettingsSection::Notifications => "notifications",
            SettingsSection::Watcher => "watcher",
        }
    }
}

/// Where the user currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    pub page: Page,
    pub tab: SettingsSection,
}

impl Location {
    /// The editable section the user would leave by navigating away.
    pub fn editable_section(&self) -> Option<SettingsSection> {
        match self.page {
            Page::Settings => Some(self.tab),
            Page::Watcher => Some(SettingsSection::Watcher),
            _ => None,
        }
    }

    pub(crate) fn resolve(&self, destination: Destination) -> Location {
        match destination {
            Destination::Page(page) => Location {
                page,
                tab: self.tab,
            },
            Destination::Tab(tab) => Location {
                page: Page::Settings,
                tab,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Page(Page),
    /// A settings tab; switches to the settings page if needed.
    Tab(SettingsSection),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub last_page: Option<Page>,
    pub settings_tab: Option<SettingsSection>,
    pub import_folder: Option<String>,
    pub import_limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalKind {
    SelectedScan,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modal {
    pub kind: ModalKind,
    pub title: String,
    pub body: String,
    /// False while the request behind the modal is in flight.
    pub dismissible: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    pub(crate) started: bool,
    pub(crate) visible: bool,
    pub(crate) location: Location,
    pub(crate) observers: Observers,
    pub(crate) scan: ScanState,
    pub(crate) refresh: RefreshState,
    pub(crate) import: ImportState,
    pub(crate) watcher: WatcherMonitor,
    pub(crate) guard: NavigationGuard,
    pub(crate) modal: Option<Modal>,
    pub(crate) preferences: Preferences,
    needs_render: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            visible: true,
            ..Self::default()
        }
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel::build(self)
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn observers(&self) -> &Observers {
        &self.observers
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn is_section_dirty(&self, section: SettingsSection) -> bool {
        self.guard.is_dirty(section)
    }

    /// Returns whether anything changed since the last call and resets the
    /// flag. The shell renders only when this is true.
    pub fn consume_render(&mut self) -> bool {
        std::mem::take(&mut self.needs_render)
    }

    pub(crate) fn mark_render(&mut self) {
        self.needs_render = true;
    }

    /// Moves to `destination` without consulting the guard and returns the
    /// effects entering and leaving pages imply.
    pub(crate) fn go_to(&mut self, destination: Destination) -> Vec<crate::Effect> {
        let from = self.location;
        let to = from.resolve(destination);
        if from == to {
            return Vec::new();
        }
        self.location = to;
        self.preferences.last_page = Some(to.page);
        if to.page == Page::Settings {
            self.preferences.settings_tab = Some(to.tab);
        }
        self.mark_render();

        let mut effects = Vec::new();
        if from.page != to.page {
            effects.extend(crate::watcher::on_page_left(self, from.page));
            effects.extend(crate::watcher::on_page_entered(self, to.page));
            effects.extend(
                status_reads_for(to.page)
                    .iter()
                    .map(|kind| crate::Effect::ReadStatus(*kind)),
            );
            effects.push(crate::Effect::Reload(crate::ReloadScope::CurrentPage));
        }
        effects.push(crate::Effect::SavePreferences(self.preferences.clone()));
        effects
    }
}

/// Status reads a page performs on load. These are what let a job started
/// in another session be picked up.
pub(crate) fn status_reads_for(page: Page) -> &'static [crate::JobKind] {
    use crate::JobKind;
    match page {
        Page::Dashboard => &[JobKind::Scan, JobKind::RefreshAll],
        Page::Shows => &[JobKind::RefreshAll],
        Page::Import => &[JobKind::LibraryImport],
        Page::Watcher | Page::Settings | Page::Logs => &[],
    }
}
