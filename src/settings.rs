//! Game settings and preferences
//!
//! Persisted as JSON separately from the high score.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::persistence::{KeyValueStore, StorageError};
use crate::tuning::{Tuning, TuningError};

/// Why stored settings could not be used
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings are not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning: {0}")]
    Tuning(#[from] TuningError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// A steering control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Steer {
    Left,
    Right,
}

/// Key names (as reported by `KeyboardEvent.key`) bound to each control
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KeyBindings {
    pub steer_left: Vec<String>,
    pub steer_right: Vec<String>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            steer_left: vec!["ArrowLeft".to_string()],
            steer_right: vec!["ArrowRight".to_string()],
        }
    }
}

impl KeyBindings {
    /// Control bound to `key`, if any. Left wins if a key is bound to both.
    pub fn control_for(&self, key: &str) -> Option<Steer> {
        if self.steer_left.iter().any(|k| k == key) {
            Some(Steer::Left)
        } else if self.steer_right.iter().any(|k| k == key) {
            Some(Steer::Right)
        } else {
            None
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub keys: KeyBindings,
    /// Gameplay constants for new sessions
    pub tuning: Tuning,
    /// Fixed traffic seed (None = seed from the clock)
    pub seed: Option<u64>,
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "retroRacerSettings";

    /// Parse and validate settings JSON
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.tuning.validate()?;
        Ok(settings)
    }

    /// Load settings, falling back to defaults if missing or invalid
    pub fn load(store: &impl KeyValueStore) -> Self {
        let Some(json) = store.get(Self::STORAGE_KEY) else {
            log::info!("Using default settings");
            return Self::default();
        };

        match Self::from_json(&json) {
            Ok(settings) => {
                log::info!("Loaded settings");
                settings
            }
            Err(e) => {
                log::warn!("Ignoring stored settings: {}", e);
                Self::default()
            }
        }
    }

    /// Save settings
    pub fn save(&self, store: &mut impl KeyValueStore) -> Result<(), SettingsError> {
        self.tuning.validate()?;
        let json = serde_json::to_string(self)?;
        store.set(Self::STORAGE_KEY, &json)?;
        log::info!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_default_bindings() {
        let keys = KeyBindings::default();
        assert_eq!(keys.control_for("ArrowLeft"), Some(Steer::Left));
        assert_eq!(keys.control_for("ArrowRight"), Some(Steer::Right));
        assert_eq!(keys.control_for("a"), None);
    }

    #[test]
    fn test_save_and_load() {
        let mut store = MemoryStore::new();
        let settings = Settings {
            keys: KeyBindings {
                steer_left: vec!["a".into(), "ArrowLeft".into()],
                steer_right: vec!["d".into()],
            },
            tuning: Tuning {
                base_speed: 180.0,
                ..Default::default()
            },
            seed: Some(7),
        };
        settings.save(&mut store).unwrap();
        assert_eq!(Settings::load(&store), settings);
    }

    #[test]
    fn test_load_invalid_falls_back() {
        let mut store = MemoryStore::new();
        store.set(Settings::STORAGE_KEY, "{not json").unwrap();
        assert_eq!(Settings::load(&store), Settings::default());

        store
            .set(Settings::STORAGE_KEY, r#"{"tuning": {"turnSpeed": -5.0}}"#)
            .unwrap();
        assert_eq!(Settings::load(&store), Settings::default());
    }

    #[test]
    fn test_load_rejects_tuning_that_breaks_the_sim() {
        let mut store = MemoryStore::new();
        for json in [
            r#"{"tuning": {"turnSpeed": 1e39, "baseSpeed": 1e39}}"#,
            r#"{"tuning": {"speedRamp": 0.0}}"#,
        ] {
            assert!(matches!(
                Settings::from_json(json),
                Err(SettingsError::Tuning(_))
            ));
            store.set(Settings::STORAGE_KEY, json).unwrap();
            assert_eq!(Settings::load(&store), Settings::default());
        }
    }

    #[test]
    fn test_partial_json() {
        let settings = Settings::from_json(r#"{"seed": 12}"#).unwrap();
        assert_eq!(settings.seed, Some(12));
        assert_eq!(settings.keys, KeyBindings::default());
    }

    #[test]
    fn test_save_rejects_invalid_tuning() {
        let mut store = MemoryStore::new();
        let settings = Settings {
            tuning: Tuning {
                score_divisor: 0.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            settings.save(&mut store),
            Err(SettingsError::Tuning(_))
        ));
        assert!(store.is_empty());
    }
}
