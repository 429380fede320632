//! High score persistence
//!
//! A single scalar, read at session start and written only when beaten.
//! Storage is best-effort: failures are logged and swallowed, never surfaced
//! to the game.

use std::collections::BTreeMap;
use std::path::PathBuf;

use thiserror::Error;

use crate::consts::HIGH_SCORE_KEY;

/// Where the best score lives between sessions
pub trait HighScoreStore {
    /// Stored high score, 0 if there is none or it cannot be read
    fn load_high_score(&mut self) -> u64;

    /// Persist a new high score. Failures are ignored.
    fn save_high_score(&mut self, score: u64);
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("high score storage unavailable")]
    Io(#[from] std::io::Error),
    #[error("high score record is malformed")]
    Json(#[from] serde_json::Error),
}

/// In-memory store (tests, headless runs)
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub high_score: Option<u64>,
    /// Number of successful saves
    pub saves: u32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_high_score(score: u64) -> Self {
        Self {
            high_score: Some(score),
            saves: 0,
        }
    }
}

impl HighScoreStore for MemoryStore {
    fn load_high_score(&mut self) -> u64 {
        self.high_score.unwrap_or(0)
    }

    fn save_high_score(&mut self, score: u64) {
        self.high_score = Some(score);
        self.saves += 1;
    }
}

/// JSON key/value file, `{"choppywood_highscore": 1234}`
///
/// Other keys in the file are preserved on save.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_record(&self) -> Result<BTreeMap<String, serde_json::Value>, StoreError> {
        let json = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&json)?)
    }

    fn try_load(&self) -> Result<u64, StoreError> {
        let record = self.read_record()?;
        Ok(record
            .get(HIGH_SCORE_KEY)
            .and_then(parse_score)
            .unwrap_or(0))
    }

    fn try_save(&self, score: u64) -> Result<(), StoreError> {
        let mut record = self.read_record().unwrap_or_default();
        record.insert(HIGH_SCORE_KEY.to_string(), serde_json::Value::from(score));
        let json = serde_json::to_string(&record)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

/// Accept both numbers and numeric strings (older saves stored text)
fn parse_score(value: &serde_json::Value) -> Option<u64> {
    match value {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl HighScoreStore for JsonFileStore {
    fn load_high_score(&mut self) -> u64 {
        match self.try_load() {
            Ok(score) => {
                log::info!("Loaded high score {}", score);
                score
            }
            Err(e) => {
                log::info!("No high score found ({}), starting fresh", e);
                0
            }
        }
    }

    fn save_high_score(&mut self, score: u64) {
        match self.try_save(score) {
            Ok(()) => log::info!("High score {} saved", score),
            Err(e) => log::warn!("High score not saved: {}", e),
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
    fn test_memory_store_defaults_to_zero() {
        let mut store = MemoryStore::new();
        assert_eq!(store.load_high_score(), 0);
        store.save_high_score(900);
        assert_eq!(store.load_high_score(), 900);
        assert_eq!(store.saves, 1);
    }

    #[test]
    fn test_file_store_round_trip() {
        let path = temp_path("hs-roundtrip.json");
        let mut store = JsonFileStore::new(&path);
        store.save_high_score(1234);

        let mut reopened = JsonFileStore::new(&path);
        assert_eq!(reopened.load_high_score(), 1234);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_file_store_missing_file_is_zero() {
        let mut store = JsonFileStore::new(temp_path("hs-missing.json"));
        assert_eq!(store.load_high_score(), 0);
    }

    #[test]
    fn test_file_store_corrupt_file_is_zero() {
        let path = temp_path("hs-corrupt.json");
        std::fs::write(&path, "{{{").unwrap();
        let mut store = JsonFileStore::new(&path);
        assert_eq!(store.load_high_score(), 0);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_file_store_reads_string_scores_and_keeps_other_keys() {
        let path = temp_path("hs-string.json");
        std::fs::write(&path, r#"{"choppywood_highscore": "450", "volume": 3}"#).unwrap();
        let mut store = JsonFileStore::new(&path);
        assert_eq!(store.load_high_score(), 450);

        store.save_high_score(500);
        let json = std::fs::read_to_string(&path).unwrap();
        let record: BTreeMap<String, serde_json::Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(record[HIGH_SCORE_KEY], serde_json::json!(500));
        assert_eq!(record["volume"], serde_json::json!(3));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_file_store_unwritable_path_is_swallowed() {
        let dir = temp_path("hs-dir");
        std::fs::create_dir_all(&dir).unwrap();
        // Writing to a directory path fails; save must not panic
        let mut store = JsonFileStore::new(&dir);
        store.save_high_score(10);
        assert_eq!(store.load_high_score(), 0);
        let _ = std::fs::remove_dir(&dir);
    }
}
