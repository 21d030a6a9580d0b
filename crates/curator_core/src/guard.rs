use std::collections::BTreeMap;

use crate::{AppState, Destination, Effect, Notice, SettingsSection};

/// Answer to an unsaved-changes prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardChoice {
    Save,
    Discard,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PendingStage {
    Prompting,
    Saving,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PendingNavigation {
    pub(crate) section: SettingsSection,
    pub(crate) destination: Destination,
    pub(crate) stage: PendingStage,
}

/// Per-section dirty flags plus the navigation held behind a prompt.
///
/// A section is dirty while it has an entry in `edits`. The value counts
/// edits so a save only clears the flag if nothing was edited after the
/// save request went out.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NavigationGuard {
    edits: BTreeMap<SettingsSection, u64>,
    saving: BTreeMap<SettingsSection, u64>,
    pending: Option<PendingNavigation>,
}

impl NavigationGuard {
    pub fn is_dirty(&self, section: SettingsSection) -> bool {
        self.edits.contains_key(&section)
    }

    pub fn dirty_sections(&self) -> Vec<SettingsSection> {
        self.edits.keys().copied().collect()
    }

    pub fn is_saving(&self, section: SettingsSection) -> bool {
        self.saving.contains_key(&section)
    }

    pub(crate) fn pending(&self) -> Option<PendingNavigation> {
        self.pending
    }

    fn begin_save(&mut self, section: SettingsSection) -> Option<Effect> {
        let edits = *self.edits.get(&section)?;
        self.saving.insert(section, edits);
        Some(Effect::SaveSection(section))
    }
}

pub(crate) fn on_navigate(state: &mut AppState, destination: Destination) -> Vec<Effect> {
    if state.guard.pending.is_some() {
        return Vec::new();
    }
    if let Some(section) = state.location.editable_section() {
        let target = state.location.resolve(destination);
        let leaving = target != state.location && target.editable_section() != Some(section);
        if leaving && state.guard.is_dirty(section) {
            state.guard.pending = Some(PendingNavigation {
                section,
                destination,
                stage: PendingStage::Prompting,
            });
            state.mark_render();
            return vec![Effect::PromptUnsaved {
                section,
                destination,
            }];
        }
    }
    state.go_to(destination)
}

pub(crate) fn on_edited(state: &mut AppState, section: SettingsSection) -> Vec<Effect> {
    let edits = state.guard.edits.entry(section).or_insert(0);
    *edits += 1;
    if *edits == 1 {
        state.mark_render();
    }
    Vec::new()
}

pub(crate) fn on_save_clicked(state: &mut AppState, section: SettingsSection) -> Vec<Effect> {
    if state.guard.is_saving(section) {
        return Vec::new();
    }
    let effects: Vec<Effect> = state.guard.begin_save(section).into_iter().collect();
    if !effects.is_empty() {
        state.mark_render();
    }
    effects
}

pub(crate) fn on_discard_clicked(state: &mut AppState, section: SettingsSection) -> Vec<Effect> {
    if state.guard.edits.remove(&section).is_none() {
        return Vec::new();
    }
    state.mark_render();
    vec![Effect::DiscardSection(section)]
}

pub(crate) fn on_choice(state: &mut AppState, choice: GuardChoice) -> Vec<Effect> {
    let Some(pending) = state.guard.pending else {
        return Vec::new();
    };
    if pending.stage != PendingStage::Prompting {
        return Vec::new();
    }
    state.mark_render();
    match choice {
        GuardChoice::Save => {
            if state.guard.is_saving(pending.section) {
                state.guard.pending = Some(PendingNavigation {
                    stage: PendingStage::Saving,
                    ..pending
                });
                return Vec::new();
            }
            match state.guard.begin_save(pending.section) {
                Some(effect) => {
                    state.guard.pending = Some(PendingNavigation {
                        stage: PendingStage::Saving,
                        ..pending
                    });
                    vec![effect]
                }
                None => {
                    state.guard.pending = None;
                    state.go_to(pending.destination)
                }
            }
        }
        GuardChoice::Discard => {
            state.guard.pending = None;
            state.guard.edits.remove(&pending.section);
            let mut effects = vec![Effect::DiscardSection(pending.section)];
            effects.extend(state.go_to(pending.destination));
            effects
        }
        GuardChoice::Cancel => {
            state.guard.pending = None;
            Vec::new()
        }
    }
}

pub(crate) fn on_save_finished(
    state: &mut AppState,
    section: SettingsSection,
    result: Result<(), String>,
) -> Vec<Effect> {
    let Some(saved_edits) = state.guard.saving.remove(&section) else {
        return Vec::new();
    };
    state.mark_render();

    let waiting = state
        .guard
        .pending
        .filter(|p| p.section == section && p.stage == PendingStage::Saving);

    match result {
        Ok(()) => {
            if state.guard.edits.get(&section) == Some(&saved_edits) {
                state.guard.edits.remove(&section);
            }
            let mut effects = vec![Effect::Notify(Notice::success(format!(
                "Saved {} settings",
                section.as_str()
            )))];
            if let Some(pending) = waiting {
                state.guard.pending = None;
                effects.extend(state.go_to(pending.destination));
            }
            effects
        }
        Err(message) => {
            if waiting.is_some() {
                state.guard.pending = None;
            }
            vec![Effect::Notify(Notice::error(format!(
                "Could not save {} settings: {message}",
                section.as_str()
            )))]
        }
    }
}
