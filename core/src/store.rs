//! Session persistence contract.
//!
//! [`SessionStore`] is what the engine talks to: best-effort, never fails the
//! caller. [`RecordStore`] implements it over any [`StorageBackend`] (a raw
//! string slot, the moral equivalent of one browser storage key) and owns
//! the validation rules: corrupt or stale records are purged and reported as
//! absent.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use thiserror::Error;
use tracing::{debug, info, warn};

use quartet_types::{CivilDate, Puzzle};

use crate::session::Session;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("session record could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// A single durable string slot.
pub trait StorageBackend: Send + Sync {
    fn read(&self) -> Result<Option<String>, StorageError>;
    fn write(&self, contents: &str) -> Result<(), StorageError>;
    fn remove(&self) -> Result<(), StorageError>;
}

/// Load/save/clear of the day's session. Failures are logged and swallowed;
/// gameplay continues in memory.
pub trait SessionStore: Send + Sync {
    /// The stored session, if it is well-formed and belongs to `puzzle` on `today`.
    /// Anything else is purged.
    fn load(&self, puzzle: &Puzzle, today: CivilDate) -> Option<Session>;
    fn save(&self, session: &Session);
    fn clear(&self);
}

/// JSON session records over a [`StorageBackend`].
#[derive(Debug, Default)]
pub struct RecordStore<B> {
    backend: B,
}

impl<B: StorageBackend> RecordStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn purge(&self, reason: &str) {
        info!(reason, "Discarding stored session");
        if let Err(e) = self.backend.remove() {
            warn!("Failed to purge stored session: {e}");
        }
    }
}

impl<B: StorageBackend> SessionStore for RecordStore<B> {
    fn load(&self, puzzle: &Puzzle, today: CivilDate) -> Option<Session> {
        let raw = match self.backend.read() {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Failed to read stored session: {e}");
                return None;
            }
        };

        let session: Session = match serde_json::from_str(&raw) {
            Ok(session) => session,
            Err(e) => {
                warn!("Stored session is corrupt: {e}");
                self.purge("corrupt record");
                return None;
            }
        };

        if let Some(problem) = session.shape_problem() {
            warn!(problem, "Stored session failed validation");
            self.purge(problem);
            return None;
        }

        if !session.is_current(puzzle.puzzle_id(), today) {
            let reason = if session.date() == today {
                "puzzle changed"
            } else {
                "stale date"
            };
            self.purge(reason);
            return None;
        }

        if let Some(problem) = session.consistency_problem(puzzle) {
            warn!(problem, "Stored session does not match its puzzle");
            self.purge(problem);
            return None;
        }

        debug!(date = %today, status = session.status().as_str(), "Loaded stored session");
        Some(session)
    }

    fn save(&self, session: &Session) {
        let encoded = match serde_json::to_string(session) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!("Failed to encode session: {}", StorageError::from(e));
                return;
            }
        };
        if let Err(e) = self.backend.write(&encoded) {
            warn!("Failed to store session, continuing in memory: {e}");
        }
    }

    fn clear(&self) {
        if let Err(e) = self.backend.remove() {
            warn!("Failed to clear stored session: {e}");
        }
    }
}

/// In-process storage slot. Used when persistence is disabled and in tests.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    record: Mutex<Option<String>>,
    fail_writes: AtomicBool,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_record(contents: impl Into<String>) -> Self {
        Self {
            record: Mutex::new(Some(contents.into())),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Make every subsequent write fail, as a full or disabled store would.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }

    #[must_use]
    pub fn contents(&self) -> Option<String> {
        self.record
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self) -> Result<Option<String>, StorageError> {
        Ok(self.contents())
    }

    fn write(&self, contents: &str) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(StorageError::Unavailable("quota exceeded".to_string()));
        }
        *self.record.lock().unwrap_or_else(PoisonError::into_inner) = Some(contents.to_string());
        Ok(())
    }

    fn remove(&self) -> Result<(), StorageError> {
        self.record
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use quartet_types::{Category, Level, Outcome};

    use super::*;
    use crate::Game;

    fn puzzle_with(last: &str) -> Arc<Puzzle> {
        Arc::new(
            Puzzle::new(
                [
                    Category::new("L1", ["A", "B", "C", "D"], Level::One).unwrap(),
                    Category::new("L2", ["E", "F", "G", "H"], Level::Two).unwrap(),
                    Category::new("L3", ["I", "J", "K", "L"], Level::Three).unwrap(),
                    Category::new(last, ["M", "N", "O", "P"], Level::Four).unwrap(),
                ],
                10,
            )
            .unwrap(),
        )
    }

    fn today() -> CivilDate {
        CivilDate::from_ymd(2026, 1, 10).unwrap()
    }

    fn played(store: &Arc<RecordStore<MemoryBackend>>) -> Game {
        let mut game = Game::new(puzzle_with("L4"), today(), store.clone());
        for text in ["A", "B", "C", "D"] {
            game.select(text);
        }
        assert_eq!(game.submit(), Ok(Outcome::Correct));
        for text in ["E", "F", "G", "I"] {
            game.select(text);
        }
        assert_eq!(game.submit(), Ok(Outcome::OneAway));
        game
    }

    fn stored_json(store: &RecordStore<MemoryBackend>) -> serde_json::Value {
        serde_json::from_str(&store.backend().contents().unwrap()).unwrap()
    }

    #[test]
    fn round_trip_reproduces_session() {
        let store = Arc::new(RecordStore::new(MemoryBackend::new()));
        let game = played(&store);
        let loaded = store.load(game.puzzle(), today()).unwrap();
        assert_eq!(&loaded, game.session());
    }

    #[test]
    fn record_uses_documented_field_names() {
        let store = Arc::new(RecordStore::new(MemoryBackend::new()));
        played(&store);
        let json = stored_json(&store);
        for field in [
            "version",
            "date",
            "status",
            "clearedCategories",
            "guessHistory",
            "mistakesRemaining",
            "gameWords",
            "puzzleId",
        ] {
            assert!(json.get(field).is_some(), "missing {field}");
        }
        assert_eq!(json["status"], "in-progress");
        assert_eq!(json["date"], "2026-01-10");
        assert_eq!(json["mistakesRemaining"], 3);
    }

    #[test]
    fn stale_date_is_purged() {
        let store = Arc::new(RecordStore::new(MemoryBackend::new()));
        let game = played(&store);
        let tomorrow = today().next_day().unwrap();
        assert!(store.load(game.puzzle(), tomorrow).is_none());
        assert!(store.backend().contents().is_none());
    }

    #[test]
    fn different_puzzle_is_purged() {
        let store = Arc::new(RecordStore::new(MemoryBackend::new()));
        played(&store);
        assert!(store.load(&puzzle_with("OTHER"), today()).is_none());
        assert!(store.backend().contents().is_none());
    }

    #[test]
    fn corrupt_json_is_purged() {
        let store = RecordStore::new(MemoryBackend::with_record("{not json"));
        assert!(store.load(&puzzle_with("L4"), today()).is_none());
        assert!(store.backend().contents().is_none());
    }

    #[test]
    fn unknown_status_is_purged() {
        let store = Arc::new(RecordStore::new(MemoryBackend::new()));
        played(&store);
        let mut json = stored_json(&store);
        json["status"] = "paused".into();
        let store = RecordStore::new(MemoryBackend::with_record(json.to_string()));
        assert!(store.load(&puzzle_with("L4"), today()).is_none());
        assert!(store.backend().contents().is_none());
    }

    #[test]
    fn empty_puzzle_id_and_wrong_version_are_purged() {
        let source = Arc::new(RecordStore::new(MemoryBackend::new()));
        played(&source);
        let original = stored_json(&source);

        let mut json = original.clone();
        json["puzzleId"] = "  ".into();
        let store = RecordStore::new(MemoryBackend::with_record(json.to_string()));
        assert!(store.load(&puzzle_with("L4"), today()).is_none());
        assert!(store.backend().contents().is_none());

        let mut json = original;
        json["version"] = 99.into();
        let store = RecordStore::new(MemoryBackend::with_record(json.to_string()));
        assert!(store.load(&puzzle_with("L4"), today()).is_none());
    }

    #[test]
    fn inconsistent_board_is_purged() {
        let store = Arc::new(RecordStore::new(MemoryBackend::new()));
        played(&store);
        let mut json = stored_json(&store);
        json["gameWords"].as_array_mut().unwrap().pop();
        let store = RecordStore::new(MemoryBackend::with_record(json.to_string()));
        assert!(store.load(&puzzle_with("L4"), today()).is_none());
    }

    #[test]
    fn won_status_without_four_cleared_is_purged() {
        let store = Arc::new(RecordStore::new(MemoryBackend::new()));
        played(&store);
        let mut json = stored_json(&store);
        json["status"] = "won".into();
        let store = RecordStore::new(MemoryBackend::with_record(json.to_string()));
        assert!(store.load(&puzzle_with("L4"), today()).is_none());
    }

    #[test]
    fn clear_removes_record() {
        let store = Arc::new(RecordStore::new(MemoryBackend::new()));
        played(&store);
        store.clear();
        assert!(store.backend().contents().is_none());
    }

    #[test]
    fn failed_write_is_swallowed() {
        let store = RecordStore::new(MemoryBackend::new());
        store.backend().set_fail_writes(true);
        let other = Arc::new(RecordStore::new(MemoryBackend::new()));
        let game = played(&other);
        store.save(game.session());
        assert!(store.backend().contents().is_none());
    }
}
