use curator_core::Preferences;
use curator_engine::KeyValueStore;
use curator_logging::{curator_error, curator_info, curator_warn};

const PREFERENCES_KEY: &str = "preferences";

pub(crate) fn load_preferences(store: &dyn KeyValueStore) -> Preferences {
    let text = match store.get(PREFERENCES_KEY) {
        Ok(Some(text)) => text,
        Ok(None) => return Preferences::default(),
        Err(err) => {
            curator_warn!("Failed to read preferences: {}", err);
            return Preferences::default();
        }
    };

    match ron::from_str(&text) {
        Ok(preferences) => {
            curator_info!("Loaded preferences");
            preferences
        }
        Err(err) => {
            curator_warn!("Failed to parse stored preferences: {}", err);
            Preferences::default()
        }
    }
}

pub(crate) fn save_preferences(store: &mut dyn KeyValueStore, preferences: &Preferences) {
    let text = match ron::to_string(preferences) {
        Ok(text) => text,
        Err(err) => {
            curator_error!("Failed to serialize preferences: {}", err);
            return;
        }
    };
    if let Err(err) = store.set(PREFERENCES_KEY, &text) {
        curator_error!("Failed to store preferences: {}", err);
    }
}
