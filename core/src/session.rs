//! The persisted per-day session record.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use quartet_types::{
    CATEGORY_COUNT, CATEGORY_SIZE, Category, CivilDate, Item, MAX_MISTAKES, Puzzle, PuzzleId,
    SessionStatus,
};

/// One day's play against one puzzle.
///
/// Serialized as the session record stored between runs:
/// `{ version, date, status, clearedCategories, revealedCategories,
///    guessHistory, mistakesRemaining, gameWords, puzzleId }`.
///
/// Fields are only mutated through [`crate::Game`], which upholds the
/// selection cap, guess uniqueness and one-way status transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub(crate) version: u32,
    pub(crate) puzzle_id: PuzzleId,
    pub(crate) date: CivilDate,
    pub(crate) status: SessionStatus,
    #[serde(rename = "gameWords")]
    pub(crate) items: Vec<Item>,
    pub(crate) cleared_categories: Vec<Category>,
    #[serde(default)]
    pub(crate) revealed_categories: Vec<Category>,
    pub(crate) guess_history: Vec<Vec<Item>>,
    pub(crate) mistakes_remaining: u8,
}

impl Session {
    /// Current record schema version.
    pub const CURRENT_VERSION: u32 = 1;

    /// A fresh in-progress session with the puzzle's items in the given order.
    pub(crate) fn fresh(puzzle: &Puzzle, date: CivilDate, items: Vec<Item>) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            puzzle_id: puzzle.puzzle_id().clone(),
            date,
            status: SessionStatus::InProgress,
            items,
            cleared_categories: Vec::new(),
            revealed_categories: Vec::new(),
            guess_history: Vec::new(),
            mistakes_remaining: MAX_MISTAKES,
        }
    }

    #[must_use]
    pub fn puzzle_id(&self) -> &PuzzleId {
        &self.puzzle_id
    }

    #[must_use]
    pub fn date(&self) -> CivilDate {
        self.date
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    #[must_use]
    pub fn cleared_categories(&self) -> &[Category] {
        &self.cleared_categories
    }

    #[must_use]
    pub fn revealed_categories(&self) -> &[Category] {
        &self.revealed_categories
    }

    #[must_use]
    pub fn guess_history(&self) -> &[Vec<Item>] {
        &self.guess_history
    }

    #[must_use]
    pub fn mistakes_remaining(&self) -> u8 {
        self.mistakes_remaining
    }

    /// Whether this record may be resumed against `puzzle` on `today`.
    #[must_use]
    pub fn is_current(&self, puzzle_id: &PuzzleId, today: CivilDate) -> bool {
        self.puzzle_id == *puzzle_id && self.date == today
    }

    /// Structural checks that serde cannot express. Returns the first problem found.
    pub(crate) fn shape_problem(&self) -> Option<&'static str> {
        if self.version != Self::CURRENT_VERSION {
            return Some("unsupported record version");
        }
        if self.puzzle_id.is_empty() {
            return Some("empty puzzle id");
        }
        if self.mistakes_remaining > MAX_MISTAKES {
            return Some("mistakes remaining out of range");
        }
        None
    }

    /// Checks that the record describes a reachable state of `puzzle`.
    pub(crate) fn consistency_problem(&self, puzzle: &Puzzle) -> Option<&'static str> {
        let solved = || self.cleared_categories.iter().chain(&self.revealed_categories);

        if solved().any(|c| puzzle.category(c.level()) != c) {
            return Some("solved category not in puzzle");
        }
        let mut levels = HashSet::new();
        if !solved().all(|c| levels.insert(c.level())) {
            return Some("category solved twice");
        }
        if self
            .items
            .iter()
            .any(|item| puzzle.category_of(&item.text).map(Category::level) != Some(item.level))
        {
            return Some("item not in puzzle");
        }
        if self.items.iter().any(|item| levels.contains(&item.level)) {
            return Some("item of a solved category still on the board");
        }
        let unique: HashSet<&str> = self.items.iter().map(|item| item.text.as_str()).collect();
        if unique.len() != self.items.len()
            || self.items.len() + levels.len() * CATEGORY_SIZE
                != CATEGORY_COUNT * CATEGORY_SIZE
        {
            return Some("board does not account for every item");
        }
        if self.items.iter().filter(|item| item.selected).count() > CATEGORY_SIZE {
            return Some("too many items selected");
        }
        let won = self.cleared_categories.len() == CATEGORY_COUNT;
        if won != (self.status == SessionStatus::Won) {
            return Some("status disagrees with cleared categories");
        }
        if self.mistakes_remaining == 0 && self.status != SessionStatus::Lost {
            return Some("no mistakes remaining but not lost");
        }
        None
    }
}
