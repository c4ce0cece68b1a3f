//! Shared fixtures for the engine's unit tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use quartet_puzzle::{FetchError, PuzzleFeed, SourceError};
use quartet_types::{Category, Level, Puzzle};

/// The `n`th distinct puzzle: category names carry `n`, items are fixed.
pub(crate) fn fixture_puzzle(n: u64, day_of_year: u16) -> Puzzle {
    Puzzle::new(
        [
            Category::new(&format!("FIRST {n}"), ["A", "B", "C", "D"], Level::One).unwrap(),
            Category::new("SECOND", ["E", "F", "G", "H"], Level::Two).unwrap(),
            Category::new("THIRD", ["I", "J", "K", "L"], Level::Three).unwrap(),
            Category::new("FOURTH", ["M", "N", "O", "P"], Level::Four).unwrap(),
        ],
        day_of_year,
    )
    .unwrap()
}

/// Serves `fixture_puzzle(load number)` until told to fail.
///
/// Clones share state, so a test can keep a handle while the source owns one.
#[derive(Clone, Default)]
pub(crate) struct ScriptedFeed(Arc<ScriptedState>);

#[derive(Default)]
pub(crate) struct ScriptedState {
    loads: AtomicU64,
    failure: Mutex<Option<FetchError>>,
}

impl std::ops::Deref for ScriptedFeed {
    type Target = ScriptedState;

    fn deref(&self) -> &ScriptedState {
        &self.0
    }
}

impl ScriptedState {
    pub(crate) fn loads(&self) -> u64 {
        self.loads.load(Ordering::SeqCst)
    }

    pub(crate) fn fail_with(&self, failure: Option<FetchError>) {
        *self.failure.lock().unwrap_or_else(PoisonError::into_inner) = failure;
    }
}

impl PuzzleFeed for ScriptedFeed {
    async fn load(&self, day_of_year: u16) -> Result<Puzzle, SourceError> {
        let n = self.loads.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::task::yield_now().await;
        let failure = self
            .failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match failure {
            Some(e) => Err(e.into()),
            None => Ok(fixture_puzzle(n, day_of_year)),
        }
    }
}
