//! Startup settings
//!
//! Read once before the engine is built. Game balance is not in here; it is
//! fixed in [`crate::consts`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Settings and dev flags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Dev tooling (keep off for release) ===
    /// Auto-chop every log PERFECT as soon as it becomes choppable
    pub god_mode: bool,
    /// Accept dev commands (axe tier and sky theme hotkeys)
    pub dev_hotkeys: bool,

    // === Storage ===
    /// File the high score is kept in
    pub high_score_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            god_mode: false,
            dev_hotkeys: false,
            high_score_path: PathBuf::from("choppywood_highscore.json"),
        }
    }
}

impl Settings {
    /// Default settings file name
    pub const FILE_NAME: &'static str = "choppywood_settings.json";

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: &Path) -> Self {
        if let Ok(json) = std::fs::read_to_string(path) {
            match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    return settings;
                }
                Err(e) => log::warn!("Ignoring malformed settings {}: {}", path.display(), e),
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings as JSON (best-effort)
    pub fn save(&self, path: &Path) {
        match serde_json::to_string_pretty(self) {
            Ok(json) => match std::fs::write(path, json) {
                Ok(()) => log::info!("Settings saved"),
                Err(e) => log::warn!("Could not save settings to {}: {}", path.display(), e),
            },
            Err(e) => log::warn!("Could not encode settings: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("choppywood-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let settings = Settings::load(&temp_path("does-not-exist.json"));
        assert_eq!(settings, Settings::default());
        assert!(!settings.god_mode);
        assert!(!settings.dev_hotkeys);
    }

    #[test]
    fn test_save_then_load() {
        let path = temp_path("settings-save.json");
        let settings = Settings {
            god_mode: true,
            dev_hotkeys: true,
            high_score_path: PathBuf::from("elsewhere.json"),
        };
        settings.save(&path);
        assert_eq!(Settings::load(&path), settings);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let path = temp_path("settings-partial.json");
        std::fs::write(&path, r#"{ "dev_hotkeys": true }"#).unwrap();
        let settings = Settings::load(&path);
        assert!(settings.dev_hotkeys);
        assert!(!settings.god_mode);
        assert_eq!(settings.high_score_path, Settings::default().high_score_path);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_malformed_file_gives_defaults() {
        let path = temp_path("settings-bad.json");
        std::fs::write(&path, "not json").unwrap();
        assert_eq!(Settings::load(&path), Settings::default());
        let _ = std::fs::remove_file(&path);
    }
}
