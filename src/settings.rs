use crate::catalog::{Area, Difficulty, Stance};
use gloo_storage::{LocalStorage, Storage};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

const STORAGE_KEY: &str = "userSettings";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub level: Difficulty,
    pub include_easier_tricks: bool,
    pub stances: BTreeSet<Stance>,
    pub areas: BTreeSet<Area>,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            level: Difficulty::Easy,
            include_easier_tricks: false,
            stances: BTreeSet::from([Stance::Regular, Stance::Fakie]),
            areas: BTreeSet::from([Area::Flatground]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("Please choose at least one area.")]
    NoAreas,

    #[error("Please select at least one stance.")]
    NoStances,
}

impl UserSettings {
    /// Save-time check. The filter itself accepts empty sets and simply
    /// matches nothing.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.areas.is_empty() {
            return Err(SettingsError::NoAreas);
        }
        if self.stances.is_empty() {
            return Err(SettingsError::NoStances);
        }
        Ok(())
    }

    pub fn toggle_stance(&mut self, stance: Stance) {
        if !self.stances.remove(&stance) {
            self.stances.insert(stance);
        }
    }

    pub fn toggle_area(&mut self, area: Area) {
        if !self.areas.remove(&area) {
            self.areas.insert(area);
        }
    }
}

pub trait SettingsStore {
    fn read(&self) -> UserSettings;
    fn write(&mut self, settings: &UserSettings);
}

/// Browser `localStorage` backed store.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalSettingsStore;

impl SettingsStore for LocalSettingsStore {
    fn read(&self) -> UserSettings {
        match LocalStorage::get::<UserSettings>(STORAGE_KEY) {
            Ok(settings) => settings,
            Err(err) => {
                warn!("Falling back to default user settings: {}", err);
                UserSettings::default()
            }
        }
    }

    fn write(&mut self, settings: &UserSettings) {
        if let Err(err) = LocalStorage::set(STORAGE_KEY, settings) {
            warn!("Failed to persist user settings: {}", err);
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemorySettingsStore {
    stored: Option<UserSettings>,
}

impl MemorySettingsStore {
    pub fn with(settings: UserSettings) -> Self {
        Self {
            stored: Some(settings),
        }
    }
}

impl SettingsStore for MemorySettingsStore {
    fn read(&self) -> UserSettings {
        self.stored.clone().unwrap_or_default()
    }

    fn write(&mut self, settings: &UserSettings) {
        self.stored = Some(settings.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_first_run() {
        let settings = UserSettings::default();
        assert_eq!(settings.level, Difficulty::Easy);
        assert!(!settings.include_easier_tricks);
        assert_eq!(
            settings.stances.iter().copied().collect::<Vec<_>>(),
            vec![Stance::Regular, Stance::Fakie]
        );
        assert_eq!(
            settings.areas.iter().copied().collect::<Vec<_>>(),
            vec![Area::Flatground]
        );
        assert_eq!(settings.validate(), Ok(()));
    }

    #[test]
    fn persisted_shape_uses_camel_case_and_lowercase_values() {
        let json = serde_json::to_value(UserSettings::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "level": "easy",
                "includeEasierTricks": false,
                "stances": ["regular", "fakie"],
                "areas": ["flatground"],
            })
        );

        let parsed: UserSettings = serde_json::from_str(
            r#"{"level":"xhard","includeEasierTricks":true,"stances":["switch","nollie"],"areas":["rails","ledges"]}"#,
        )
        .unwrap();
        assert_eq!(parsed.level, Difficulty::Xhard);
        assert!(parsed.stances.contains(&Stance::Switch));
        assert!(parsed.areas.contains(&Area::Ledges));
    }

    #[test]
    fn validation_rejects_empty_selections() {
        let mut settings = UserSettings::default();
        settings.toggle_area(Area::Flatground);
        assert_eq!(settings.validate(), Err(SettingsError::NoAreas));
        assert_eq!(
            SettingsError::NoAreas.to_string(),
            "Please choose at least one area."
        );

        settings.toggle_area(Area::Rails);
        settings.stances.clear();
        assert_eq!(settings.validate(), Err(SettingsError::NoStances));
    }

    #[test]
    fn toggles_add_and_remove() {
        let mut settings = UserSettings::default();
        settings.toggle_stance(Stance::Switch);
        assert!(settings.stances.contains(&Stance::Switch));
        settings.toggle_stance(Stance::Switch);
        assert!(!settings.stances.contains(&Stance::Switch));
        settings.toggle_stance(Stance::Regular);
        assert_eq!(settings.stances.len(), 1);
    }

    #[test]
    fn memory_store_round_trips_and_defaults_when_empty() {
        let mut store = MemorySettingsStore::default();
        assert_eq!(store.read(), UserSettings::default());

        let mut custom = UserSettings::default();
        custom.level = Difficulty::Hard;
        store.write(&custom);
        assert_eq!(store.read(), custom);
        assert_eq!(MemorySettingsStore::with(custom.clone()).read(), custom);
    }
}
