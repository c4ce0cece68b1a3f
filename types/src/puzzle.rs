//! Puzzle content: levels, categories, items and content-derived identity.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::text::normalize_text;

/// Number of categories in every puzzle.
pub const CATEGORY_COUNT: usize = 4;

/// Number of items in every category.
pub const CATEGORY_SIZE: usize = 4;

/// Difficulty level of a category. Each puzzle has exactly one category per level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Level {
    One,
    Two,
    Three,
    Four,
}

impl Level {
    /// All levels in canonical (ascending) order.
    pub const ALL: [Level; CATEGORY_COUNT] = [Level::One, Level::Two, Level::Three, Level::Four];

    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Level::One => 1,
            Level::Two => 2,
            Level::Three => 3,
            Level::Four => 4,
        }
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.number() as usize - 1
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("level must be between 1 and 4, got {0}")]
pub struct InvalidLevel(pub u8);

impl TryFrom<u8> for Level {
    type Error = InvalidLevel;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Level::One),
            2 => Ok(Level::Two),
            3 => Ok(Level::Three),
            4 => Ok(Level::Four),
            other => Err(InvalidLevel(other)),
        }
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        level.number()
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Validation failures for puzzle content.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PuzzleError {
    #[error("category name must not be empty")]
    EmptyName,
    #[error("category {name:?} has an empty item")]
    EmptyItem { name: String },
    #[error("category {name:?} repeats item {item:?}")]
    RepeatedItem { name: String, item: String },
    #[error("level {0} appears more than once")]
    DuplicateLevel(Level),
    #[error("item {0:?} appears in more than one category")]
    DuplicateItem(String),
    #[error("puzzle id {claimed:?} does not match its categories")]
    IdMismatch { claimed: String },
}

/// One playable tile. Identity within a session is its normalized `text`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    pub text: String,
    pub level: Level,
    #[serde(default)]
    pub selected: bool,
}

impl Item {
    #[must_use]
    pub fn new(text: impl Into<String>, level: Level) -> Self {
        Self {
            text: text.into(),
            level,
            selected: false,
        }
    }
}

/// A hidden group of four items sharing a theme.
///
/// Construction normalizes every text field, so two categories built from
/// differently-spaced or differently-cased input compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CategoryWire")]
pub struct Category {
    name: String,
    items: [String; CATEGORY_SIZE],
    level: Level,
}

#[derive(Deserialize)]
struct CategoryWire {
    #[serde(alias = "category")]
    name: String,
    items: [String; CATEGORY_SIZE],
    level: Level,
}

impl TryFrom<CategoryWire> for Category {
    type Error = PuzzleError;

    fn try_from(wire: CategoryWire) -> Result<Self, Self::Error> {
        Self::new(&wire.name, wire.items, wire.level)
    }
}

impl Category {
    pub fn new(
        name: &str,
        items: [impl AsRef<str>; CATEGORY_SIZE],
        level: Level,
    ) -> Result<Self, PuzzleError> {
        let name = normalize_text(name);
        if name.is_empty() {
            return Err(PuzzleError::EmptyName);
        }
        let items = items.map(|item| normalize_text(item.as_ref()));
        let mut seen = HashSet::with_capacity(CATEGORY_SIZE);
        for item in &items {
            if item.is_empty() {
                return Err(PuzzleError::EmptyItem { name });
            }
            if !seen.insert(item.as_str()) {
                return Err(PuzzleError::RepeatedItem {
                    item: item.clone(),
                    name,
                });
            }
        }
        Ok(Self { name, items, level })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn items(&self) -> &[String; CATEGORY_SIZE] {
        &self.items
    }

    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    #[must_use]
    pub fn contains(&self, text: &str) -> bool {
        self.items.iter().any(|item| item == text)
    }
}

/// Content-derived puzzle identity.
///
/// Rendered as `level:NAME:ITEM1:ITEM2:ITEM3:ITEM4` per category in level
/// order, joined with `|`. Day indexes can collide or be skipped by fallback
/// selection, so sessions key off this instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PuzzleId(String);

impl PuzzleId {
    #[must_use]
    pub fn from_categories(categories: &[Category; CATEGORY_COUNT]) -> Self {
        let id = categories
            .iter()
            .map(|category| {
                let mut part = format!("{}:{}", category.level, category.name);
                for item in &category.items {
                    part.push(':');
                    part.push_str(item);
                }
                part
            })
            .collect::<Vec<_>>()
            .join("|");
        Self(id)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for PuzzleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated daily puzzle: four categories (one per level, stored in level
/// order) whose sixteen items are globally unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "PuzzleWire")]
pub struct Puzzle {
    categories: [Category; CATEGORY_COUNT],
    puzzle_id: PuzzleId,
    day_index: u16,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PuzzleWire {
    categories: [Category; CATEGORY_COUNT],
    puzzle_id: Option<PuzzleId>,
    #[serde(alias = "dayOfYear")]
    day_index: u16,
}

impl TryFrom<PuzzleWire> for Puzzle {
    type Error = PuzzleError;

    fn try_from(wire: PuzzleWire) -> Result<Self, Self::Error> {
        let puzzle = Self::new(wire.categories, wire.day_index)?;
        if let Some(claimed) = wire.puzzle_id
            && claimed != puzzle.puzzle_id
        {
            return Err(PuzzleError::IdMismatch {
                claimed: claimed.0,
            });
        }
        Ok(puzzle)
    }
}

impl Puzzle {
    /// Validate and assemble a puzzle. Categories may arrive in any order;
    /// they are stored sorted by level.
    pub fn new(
        mut categories: [Category; CATEGORY_COUNT],
        day_index: u16,
    ) -> Result<Self, PuzzleError> {
        categories.sort_by_key(Category::level);
        for pair in categories.windows(2) {
            if pair[0].level == pair[1].level {
                return Err(PuzzleError::DuplicateLevel(pair[0].level));
            }
        }

        let mut seen = HashSet::with_capacity(CATEGORY_COUNT * CATEGORY_SIZE);
        for item in categories.iter().flat_map(|c| c.items.iter()) {
            if !seen.insert(item.as_str()) {
                return Err(PuzzleError::DuplicateItem(item.clone()));
            }
        }

        let puzzle_id = PuzzleId::from_categories(&categories);
        Ok(Self {
            categories,
            puzzle_id,
            day_index,
        })
    }

    /// Categories in level order.
    #[must_use]
    pub fn categories(&self) -> &[Category; CATEGORY_COUNT] {
        &self.categories
    }

    #[must_use]
    pub fn category(&self, level: Level) -> &Category {
        &self.categories[level.index()]
    }

    #[must_use]
    pub fn puzzle_id(&self) -> &PuzzleId {
        &self.puzzle_id
    }

    #[must_use]
    pub fn day_index(&self) -> u16 {
        self.day_index
    }

    /// Every item of the puzzle, unselected, in level order.
    #[must_use]
    pub fn items(&self) -> Vec<Item> {
        self.categories
            .iter()
            .flat_map(|category| {
                category
                    .items
                    .iter()
                    .map(|text| Item::new(text.clone(), category.level))
            })
            .collect()
    }

    /// The category an item text belongs to, if any.
    #[must_use]
    pub fn category_of(&self, text: &str) -> Option<&Category> {
        self.categories.iter().find(|category| category.contains(text))
    }
}
