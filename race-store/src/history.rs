//! Local result history for single-player sessions: an append-only sequence
//! of `SessionResult`s persisted as one JSON blob.

use race_types::SessionResult;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history io error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed history file: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Result-history contract: load the full ordered sequence, or append one
/// completed result and persist.
pub trait HistoryStore {
    fn load_all(&self) -> Result<Vec<SessionResult>, HistoryError>;
    fn append_and_save(&self, result: SessionResult) -> Result<(), HistoryError>;
}

/// File-backed history store, one JSON array per user.
#[derive(Debug, Clone)]
pub struct JsonHistoryStore {
    path: PathBuf,
}

impl JsonHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default per-user location under the platform config directory.
    pub fn at_default_path() -> Option<Self> {
        let dirs = directories::ProjectDirs::from("", "", "typerace")?;
        Some(Self::new(dirs.config_dir().join("results.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryStore for JsonHistoryStore {
    fn load_all(&self) -> Result<Vec<SessionResult>, HistoryError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    fn append_and_save(&self, result: SessionResult) -> Result<(), HistoryError> {
        let mut results = self.load_all()?;
        results.push(result);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&results)?)?;
        debug!(count = results.len(), path = %self.path.display(), "saved result history");
        Ok(())
    }
}

/// The all-time best result by WPM, if any history exists.
pub fn personal_best(results: &[SessionResult]) -> Option<&SessionResult> {
    results.iter().max_by_key(|r| r.stats.wpm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use race_types::TypingStats;
    use tempfile::tempdir;

    fn result_with_wpm(wpm: u32, date: i64) -> SessionResult {
        let stats = TypingStats {
            wpm,
            ..TypingStats::default()
        };
        SessionResult::new(stats, 100, date)
    }

    #[test]
    fn empty_store_loads_nothing() {
        let dir = tempdir().unwrap();
        let store = JsonHistoryStore::new(dir.path().join("results.json"));
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn append_preserves_order() {
        let dir = tempdir().unwrap();
        let store = JsonHistoryStore::new(dir.path().join("results.json"));

        store.append_and_save(result_with_wpm(40, 1)).unwrap();
        store.append_and_save(result_with_wpm(60, 2)).unwrap();
        store.append_and_save(result_with_wpm(50, 3)).unwrap();

        let results = store.load_all().unwrap();
        assert_eq!(results.len(), 3);
        let dates: Vec<i64> = results.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![1, 2, 3]);
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempdir().unwrap();
        let store = JsonHistoryStore::new(dir.path().join("deep/nested/results.json"));
        store.append_and_save(result_with_wpm(40, 1)).unwrap();
        assert_eq!(store.load_all().unwrap().len(), 1);
    }

    #[test]
    fn personal_best_picks_highest_wpm() {
        let results = vec![
            result_with_wpm(40, 1),
            result_with_wpm(90, 2),
            result_with_wpm(70, 3),
        ];
        assert_eq!(personal_best(&results).unwrap().stats.wpm, 90);
        assert!(personal_best(&[]).is_none());
    }
}
