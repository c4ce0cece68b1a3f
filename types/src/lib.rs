//! Core domain types for Quartet.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod date;
mod puzzle;
mod text;

pub use date::{CivilDate, DateParseError};
pub use puzzle::{
    CATEGORY_COUNT, CATEGORY_SIZE, Category, InvalidLevel, Item, Level, Puzzle, PuzzleError,
    PuzzleId,
};
pub use text::normalize_text;

use serde::{Deserialize, Serialize};

/// Mistakes a player may make before the game is lost.
pub const MAX_MISTAKES: u8 = 4;

/// Items a player may select at once; also the size of every guess.
pub const MAX_SELECTED: usize = CATEGORY_SIZE;

// ============================================================================
// Session Lifecycle
// ============================================================================

/// Lifecycle of a daily session. Transitions are one-way out of `InProgress`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionStatus {
    #[default]
    InProgress,
    Won,
    Lost,
}

impl SessionStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, SessionStatus::InProgress)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::InProgress => "in-progress",
            SessionStatus::Won => "won",
            SessionStatus::Lost => "lost",
        }
    }
}

/// Result of submitting the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    /// Same four items were already guessed; nothing changed.
    Duplicate,
    /// A category was cleared and the game continues.
    Correct,
    /// The last category was cleared.
    Win,
    /// Three of the four items share a category; costs a mistake.
    OneAway,
    /// Costs a mistake.
    Incorrect,
    /// The final mistake was spent.
    Loss,
}

impl Outcome {
    /// Whether the outcome consumed a mistake.
    #[must_use]
    pub fn is_mistake(self) -> bool {
        matches!(self, Outcome::OneAway | Outcome::Incorrect | Outcome::Loss)
    }
}
