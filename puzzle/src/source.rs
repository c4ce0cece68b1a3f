//! Memoizing, request-coalescing access to today's puzzle.
//!
//! The source owns the process-wide puzzle cache and the in-flight load.
//! Callers that arrive while a load is running await the same shared future,
//! so a burst of requests costs one fetch. The cache is only replaced by a
//! successful load; a failed refresh leaves the previous puzzle in place.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use tracing::{info, warn};

use quartet_core::CivilClock;
use quartet_types::{CivilDate, Puzzle};

use crate::error::{FetchError, SourceError};
use crate::feed::PuzzleFeed;

type LoadResult = Result<Arc<Puzzle>, SourceError>;
type SharedLoad = Shared<BoxFuture<'static, LoadResult>>;

#[derive(Default)]
struct State {
    cached: Option<Cached>,
    in_flight: Option<InFlight>,
    generation: u64,
}

struct InFlight {
    day: CivilDate,
    load: SharedLoad,
}

struct Cached {
    day: CivilDate,
    puzzle: Arc<Puzzle>,
}

struct Inner<F> {
    feed: F,
    clock: CivilClock,
    state: Mutex<State>,
    loads: AtomicU64,
}

impl<F> Inner<F> {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Today's puzzle, fetched at most once per civil day unless forced.
pub struct PuzzleSource<F> {
    inner: Arc<Inner<F>>,
}

impl<F> Clone for PuzzleSource<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F> std::fmt::Debug for PuzzleSource<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PuzzleSource")
            .field("clock", &self.inner.clock)
            .field("loads", &self.inner.loads.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl<F: PuzzleFeed> PuzzleSource<F> {
    pub fn new(feed: F, clock: CivilClock) -> Self {
        Self {
            inner: Arc::new(Inner {
                feed,
                clock,
                state: Mutex::new(State::default()),
                loads: AtomicU64::new(0),
            }),
        }
    }

    #[must_use]
    pub fn clock(&self) -> &CivilClock {
        &self.inner.clock
    }

    /// Number of feed loads started so far.
    #[must_use]
    pub fn loads_started(&self) -> u64 {
        self.inner.loads.load(Ordering::Relaxed)
    }

    /// The memoized puzzle, regardless of which day it was fetched on.
    #[must_use]
    pub fn cached(&self) -> Option<Arc<Puzzle>> {
        self.inner
            .lock()
            .cached
            .as_ref()
            .map(|c| Arc::clone(&c.puzzle))
    }

    /// Forget the memoized puzzle and detach any in-flight load. A load that
    /// was already running completes for its own callers but is not cached.
    pub fn reset(&self) {
        let mut state = self.inner.lock();
        state.cached = None;
        state.in_flight = None;
        state.generation += 1;
    }

    /// Today's puzzle.
    ///
    /// Joins a running load for today if there is one. Otherwise serves the
    /// memoized puzzle when it was fetched today and `force_refresh` is
    /// false, and starts a load in every other case. A load still running
    /// for an earlier day is detached and never cached. Without
    /// `force_refresh`, a failed load falls back to a puzzle already
    /// memoized today.
    pub async fn fetch_daily_puzzle(&self, force_refresh: bool) -> LoadResult {
        let today = self.inner.clock.today();
        let load = {
            let mut state = self.inner.lock();
            let joinable = state
                .in_flight
                .as_ref()
                .filter(|flight| flight.day == today)
                .map(|flight| flight.load.clone());
            if let Some(load) = joinable {
                load
            } else {
                if !force_refresh
                    && let Some(cached) = state.cached.as_ref().filter(|c| c.day == today)
                {
                    return Ok(Arc::clone(&cached.puzzle));
                }
                if let Some(stale) = state.in_flight.take() {
                    info!(
                        day = %stale.day,
                        today = %today,
                        "Detaching puzzle load from an earlier day"
                    );
                    state.generation += 1;
                }
                self.start_load(&mut state, today)
            }
        };

        match load.await {
            Ok(puzzle) => Ok(puzzle),
            Err(e) if !force_refresh => {
                let state = self.inner.lock();
                match state.cached.as_ref().filter(|c| c.day == today) {
                    Some(cached) => {
                        warn!("Puzzle load failed, keeping cached puzzle: {e}");
                        Ok(Arc::clone(&cached.puzzle))
                    }
                    None => Err(e),
                }
            }
            Err(e) => Err(e),
        }
    }

    fn start_load(&self, state: &mut State, today: CivilDate) -> SharedLoad {
        let generation = state.generation;
        let day_of_year = today.day_of_year();
        let weak: Weak<Inner<F>> = Arc::downgrade(&self.inner);

        let load = async move {
            let Some(inner) = weak.upgrade() else {
                return Err(SourceError::Fetch(FetchError::Transport(
                    "puzzle source dropped".to_string(),
                )));
            };
            inner.loads.fetch_add(1, Ordering::Relaxed);
            let result = inner.feed.load(day_of_year).await.map(Arc::new);

            let mut state = inner.lock();
            if state.generation == generation {
                state.in_flight = None;
                match &result {
                    Ok(puzzle) => {
                        info!(
                            puzzle_id = %puzzle.puzzle_id(),
                            day = %today,
                            "Loaded daily puzzle"
                        );
                        state.cached = Some(Cached {
                            day: today,
                            puzzle: Arc::clone(puzzle),
                        });
                    }
                    Err(e) => warn!("Failed to load daily puzzle: {e}"),
                }
            }
            result
        }
        .boxed()
        .shared();

        state.in_flight = Some(InFlight {
            day: today,
            load: load.clone(),
        });
        load
    }
}
