//! Wiring between the puzzle source, the session store and the live game.
//!
//! The host is shared between the front-end and the rollover task. The game
//! sits behind a mutex that is never held across an await; every engine
//! operation runs to completion inside [`GameHost::with_game_mut`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::{error, info};

use quartet_core::{CivilClock, Game, SessionStore};
use quartet_puzzle::{PuzzleFeed, PuzzleSource, SourceError};

pub struct GameHost<F> {
    source: PuzzleSource<F>,
    store: Arc<dyn SessionStore>,
    game: Mutex<Option<Game>>,
    rollovers: AtomicU64,
    changed: watch::Sender<u64>,
}

impl<F> std::fmt::Debug for GameHost<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameHost")
            .field("source", &self.source)
            .field("rollovers", &self.rollovers.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl<F: PuzzleFeed> GameHost<F> {
    pub fn new(source: PuzzleSource<F>, store: Arc<dyn SessionStore>) -> Self {
        let (changed, _) = watch::channel(0);
        Self {
            source,
            store,
            game: Mutex::new(None),
            rollovers: AtomicU64::new(0),
            changed,
        }
    }

    #[must_use]
    pub fn clock(&self) -> &CivilClock {
        self.source.clock()
    }

    #[must_use]
    pub fn source(&self) -> &PuzzleSource<F> {
        &self.source
    }

    /// Completed rollovers since the host was created.
    #[must_use]
    pub fn rollovers(&self) -> u64 {
        self.rollovers.load(Ordering::Relaxed)
    }

    /// Ticks every time the game is replaced or removed.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changed.subscribe()
    }

    fn lock(&self) -> MutexGuard<'_, Option<Game>> {
        self.game.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn install(&self, game: Option<Game>) {
        *self.lock() = game;
        self.changed.send_modify(|n| *n += 1);
    }

    #[must_use]
    pub fn has_game(&self) -> bool {
        self.lock().is_some()
    }

    /// Read the live game. `None` while no puzzle could be loaded.
    pub fn with_game<R>(&self, f: impl FnOnce(&Game) -> R) -> Option<R> {
        self.lock().as_ref().map(f)
    }

    /// Run an engine operation on the live game.
    pub fn with_game_mut<R>(&self, f: impl FnOnce(&mut Game) -> R) -> Option<R> {
        self.lock().as_mut().map(f)
    }

    /// Load today's puzzle and resume the stored session for it, or start fresh.
    pub async fn open(&self) -> Result<(), SourceError> {
        let puzzle = match self.source.fetch_daily_puzzle(false).await {
            Ok(puzzle) => puzzle,
            Err(e) => {
                error!("Failed to open today's puzzle: {e}");
                self.install(None);
                return Err(e);
            }
        };
        let game = Game::open(puzzle, self.clock().today(), Arc::clone(&self.store));
        self.install(Some(game));
        Ok(())
    }

    /// Replace the session with a fresh one on a freshly fetched puzzle.
    /// On fetch failure the board is left empty.
    pub async fn rollover(&self) -> Result<(), SourceError> {
        self.store.clear();
        let result = self.source.fetch_daily_puzzle(true).await;
        self.rollovers.fetch_add(1, Ordering::Relaxed);

        match result {
            Ok(puzzle) => {
                let today = self.clock().today();
                info!(date = %today, puzzle_id = %puzzle.puzzle_id(), "Rolled over to a new day");
                self.install(Some(Game::new(puzzle, today, Arc::clone(&self.store))));
                Ok(())
            }
            Err(e) => {
                error!("Rollover could not load the new puzzle: {e}");
                self.install(None);
                Err(e)
            }
        }
    }

    /// Whether the live game belongs to an earlier civil day.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        let today = self.clock().today();
        self.with_game(|game| game.session().date() != today)
            .unwrap_or(false)
    }

    /// Catch up with a missed day boundary, retry a failed load, or swap in
    /// today's puzzle if the live game was built from a different one.
    pub async fn ensure_current(&self) -> Result<(), SourceError> {
        let today = self.clock().today();
        match self.with_game(|game| game.session().date()) {
            Some(date) if date == today => {
                let puzzle = self.source.fetch_daily_puzzle(false).await?;
                let matches = self
                    .with_game(|game| game.puzzle().puzzle_id() == puzzle.puzzle_id())
                    .unwrap_or(false);
                if !matches {
                    info!(puzzle_id = %puzzle.puzzle_id(), "Puzzle changed under the live game");
                    let game = Game::open(puzzle, today, Arc::clone(&self.store));
                    self.install(Some(game));
                }
                Ok(())
            }
            Some(date) => {
                info!(last = %date, today = %today, "Missed a day boundary");
                self.rollover().await
            }
            None => self.open().await,
        }
    }
}
