//! The game engine: authoritative session state and every transition on it.
//!
//! All operations are synchronous and run to completion. Presentation code
//! reads snapshots through the accessors or [`Game::view`] and mutates only
//! through `select`, `deselect_all`, `shuffle`, `submit`, `reveal_next`,
//! `resolve_loss` and `resolve_win`.

use std::collections::BTreeSet;
use std::sync::Arc;

use rand::seq::SliceRandom;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use quartet_types::{
    CATEGORY_COUNT, Category, CivilDate, Item, MAX_SELECTED, Outcome, Puzzle, PuzzleId,
    SessionStatus,
};

use crate::session::Session;
use crate::store::SessionStore;

/// A call made in a state that does not allow it. Nothing was mutated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PreconditionError {
    #[error("the game is already {}", .0.as_str())]
    NotInProgress(SessionStatus),
    #[error("a guess needs exactly 4 selected items, {selected} selected")]
    SelectionCount { selected: usize },
    #[error("the game has not been lost")]
    NotLost,
}

/// Read-only snapshot for presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    pub puzzle_id: PuzzleId,
    pub date: CivilDate,
    pub items: Vec<Item>,
    pub selected: Vec<Item>,
    pub cleared_categories: Vec<Category>,
    pub revealed_categories: Vec<Category>,
    pub mistakes_remaining: u8,
    pub is_won: bool,
    pub is_lost: bool,
    pub guess_history: Vec<Vec<Item>>,
}

pub struct Game {
    puzzle: Arc<Puzzle>,
    session: Session,
    store: Arc<dyn SessionStore>,
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("puzzle_id", self.puzzle.puzzle_id())
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

fn guess_key<'a>(items: impl IntoIterator<Item = &'a Item>) -> BTreeSet<&'a str> {
    items.into_iter().map(|item| item.text.as_str()).collect()
}

impl Game {
    /// Start a fresh session with a shuffled board.
    pub fn new(puzzle: Arc<Puzzle>, date: CivilDate, store: Arc<dyn SessionStore>) -> Self {
        let mut items = puzzle.items();
        items.shuffle(&mut rand::rng());
        let session = Session::fresh(&puzzle, date, items);
        info!(puzzle_id = %puzzle.puzzle_id(), date = %date, "Started new session");
        Self {
            puzzle,
            session,
            store,
        }
    }

    /// Resume the stored session for `puzzle` on `today`, or start fresh.
    pub fn open(puzzle: Arc<Puzzle>, today: CivilDate, store: Arc<dyn SessionStore>) -> Self {
        match store.load(&puzzle, today) {
            Some(session) => {
                info!(
                    puzzle_id = %puzzle.puzzle_id(),
                    status = session.status().as_str(),
                    "Resumed stored session"
                );
                Self {
                    puzzle,
                    session,
                    store,
                }
            }
            None => Self::new(puzzle, today, store),
        }
    }

    // ------------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------------

    #[must_use]
    pub fn puzzle(&self) -> &Puzzle {
        &self.puzzle
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.session.status
    }

    #[must_use]
    pub fn is_won(&self) -> bool {
        self.session.status == SessionStatus::Won
    }

    #[must_use]
    pub fn is_lost(&self) -> bool {
        self.session.status == SessionStatus::Lost
    }

    /// The board in display order.
    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.session.items
    }

    pub fn selected(&self) -> impl Iterator<Item = &Item> {
        self.session.items.iter().filter(|item| item.selected)
    }

    #[must_use]
    pub fn selected_count(&self) -> usize {
        self.selected().count()
    }

    #[must_use]
    pub fn cleared_categories(&self) -> &[Category] {
        &self.session.cleared_categories
    }

    #[must_use]
    pub fn revealed_categories(&self) -> &[Category] {
        &self.session.revealed_categories
    }

    #[must_use]
    pub fn mistakes_remaining(&self) -> u8 {
        self.session.mistakes_remaining
    }

    #[must_use]
    pub fn guess_history(&self) -> &[Vec<Item>] {
        &self.session.guess_history
    }

    /// Categories neither cleared nor revealed, in level order.
    #[must_use]
    pub fn remaining_categories(&self) -> Vec<Category> {
        self.puzzle
            .categories()
            .iter()
            .filter(|category| !self.is_solved(category))
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn view(&self) -> GameView {
        GameView {
            puzzle_id: self.session.puzzle_id.clone(),
            date: self.session.date,
            items: self.session.items.clone(),
            selected: self.selected().cloned().collect(),
            cleared_categories: self.session.cleared_categories.clone(),
            revealed_categories: self.session.revealed_categories.clone(),
            mistakes_remaining: self.session.mistakes_remaining,
            is_won: self.is_won(),
            is_lost: self.is_lost(),
            guess_history: self.session.guess_history.clone(),
        }
    }

    // ------------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------------

    /// Toggle selection of the item with this text.
    ///
    /// Selecting a fifth item, selecting after the game ended, or naming an
    /// item not on the board does nothing. Returns whether anything changed.
    pub fn select(&mut self, text: &str) -> bool {
        if self.session.status.is_terminal() {
            return false;
        }
        let selected = self.selected_count();
        let Some(item) = self.session.items.iter_mut().find(|item| item.text == text) else {
            debug!(text, "Ignoring selection of unknown item");
            return false;
        };
        if !item.selected && selected >= MAX_SELECTED {
            return false;
        }
        item.selected = !item.selected;
        true
    }

    pub fn deselect_all(&mut self) {
        for item in &mut self.session.items {
            item.selected = false;
        }
    }

    /// Reorder the board uniformly at random. Selection is untouched.
    pub fn shuffle(&mut self) {
        self.session.items.shuffle(&mut rand::rng());
    }

    // ------------------------------------------------------------------------
    // Guessing
    // ------------------------------------------------------------------------

    /// Evaluate the current selection as a guess.
    pub fn submit(&mut self) -> Result<Outcome, PreconditionError> {
        if self.session.status.is_terminal() {
            return Err(PreconditionError::NotInProgress(self.session.status));
        }
        let guess: Vec<Item> = self
            .selected()
            .map(|item| Item {
                selected: false,
                ..item.clone()
            })
            .collect();
        if guess.len() != MAX_SELECTED {
            return Err(PreconditionError::SelectionCount {
                selected: guess.len(),
            });
        }

        let key = guess_key(&guess);
        if self
            .session
            .guess_history
            .iter()
            .any(|previous| guess_key(previous) == key)
        {
            return Ok(Outcome::Duplicate);
        }

        // First maximum in level order wins ties.
        let (best, likeness) = self
            .puzzle
            .categories()
            .iter()
            .map(|category| {
                let count = guess.iter().filter(|item| category.contains(&item.text)).count();
                (category, count)
            })
            .fold(None, |best: Option<(&Category, usize)>, (category, count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((category, count)),
            })
            .map_or((None, 0), |(category, count)| (Some(category.clone()), count));

        self.session.guess_history.push(guess);

        let outcome = match best {
            Some(category) if likeness == MAX_SELECTED => self.clear_category(category),
            _ => self.spend_mistake(likeness),
        };

        debug!(?outcome, likeness, "Guess evaluated");
        self.persist();
        Ok(outcome)
    }

    fn clear_category(&mut self, category: Category) -> Outcome {
        self.session
            .items
            .retain(|item| !category.contains(&item.text));
        self.session.cleared_categories.push(category);
        if self.session.cleared_categories.len() == CATEGORY_COUNT {
            self.session.status = SessionStatus::Won;
            info!(
                mistakes_remaining = self.session.mistakes_remaining,
                "Puzzle solved"
            );
            Outcome::Win
        } else {
            Outcome::Correct
        }
    }

    fn spend_mistake(&mut self, likeness: usize) -> Outcome {
        self.session.mistakes_remaining = self.session.mistakes_remaining.saturating_sub(1);
        if self.session.mistakes_remaining == 0 {
            self.session.status = SessionStatus::Lost;
            info!("Out of mistakes");
            Outcome::Loss
        } else if likeness == MAX_SELECTED - 1 {
            Outcome::OneAway
        } else {
            Outcome::Incorrect
        }
    }

    // ------------------------------------------------------------------------
    // End of game
    // ------------------------------------------------------------------------

    fn is_solved(&self, category: &Category) -> bool {
        let level = category.level();
        self.session
            .cleared_categories
            .iter()
            .chain(&self.session.revealed_categories)
            .any(|solved| solved.level() == level)
    }

    fn may_reveal(&self) -> bool {
        self.session.status == SessionStatus::Lost || self.session.mistakes_remaining == 0
    }

    /// Reveal the lowest-level unsolved category after a loss, for paced
    /// presentation. `None` once nothing is left or if the game is not lost.
    pub fn reveal_next(&mut self) -> Option<Category> {
        if !self.may_reveal() {
            return None;
        }
        let category = self.remaining_categories().into_iter().next()?;
        self.session
            .items
            .retain(|item| !category.contains(&item.text));
        self.session.revealed_categories.push(category.clone());
        Some(category)
    }

    /// Finish a lost game: clear the selection, reveal everything still
    /// hidden (returned in level order) and fix the status as lost.
    pub fn resolve_loss(&mut self) -> Result<Vec<Category>, PreconditionError> {
        if !self.may_reveal() {
            return Err(if self.is_won() {
                PreconditionError::NotInProgress(SessionStatus::Won)
            } else {
                PreconditionError::NotLost
            });
        }
        self.deselect_all();
        let revealed: Vec<Category> = std::iter::from_fn(|| self.reveal_next()).collect();
        self.session.status = SessionStatus::Lost;
        self.persist();
        Ok(revealed)
    }

    /// Confirm a won game. Idempotent; returns whether the game is won.
    pub fn resolve_win(&mut self) -> bool {
        if self.session.cleared_categories.len() != CATEGORY_COUNT {
            return false;
        }
        self.session.status = SessionStatus::Won;
        self.persist();
        true
    }

    fn persist(&self) {
        self.store.save(&self.session);
    }
}
