//! Parser for the tabular puzzle sheet.
//!
//! One row per candidate day: a day-of-year index followed by four category
//! cells, level 1 through 4. A cell reads `NAME(item, item, item, item[, ...])`.
//! Rows that fail to parse are dropped; the sheet as a whole only fails when
//! nothing valid is left.

use thiserror::Error;
use tracing::debug;

use quartet_types::{CATEGORY_COUNT, CATEGORY_SIZE, Category, Level, Puzzle, PuzzleError};

use crate::error::SourceError;

/// Why a single sheet row was dropped.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("day index {0:?} is not a day of the year")]
    BadDay(String),
    #[error("missing cell for level {0}")]
    MissingCell(Level),
    #[error("level {level} cell has no balanced parentheses")]
    Unbalanced { level: Level },
    #[error("level {level} cell has no category name")]
    MissingName { level: Level },
    #[error("level {level} cell has {found} items, need 4")]
    TooFewItems { level: Level, found: usize },
    #[error(transparent)]
    Invalid(#[from] PuzzleError),
}

/// Split one CSV line into cells.
///
/// Quoted cells may contain commas; `""` inside quotes is a literal quote.
/// Newlines inside quotes are not supported.
#[must_use]
pub fn split_csv_line(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => cells.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    cells.push(current);
    cells
}

/// Parse a `NAME(items...)` cell. Only the first four items are kept.
pub fn parse_category_cell(cell: &str, level: Level) -> Result<Category, ParseError> {
    let cell = cell.trim();
    let (Some(open), Some(close)) = (cell.find('('), cell.rfind(')')) else {
        return Err(ParseError::Unbalanced { level });
    };
    if close < open {
        return Err(ParseError::Unbalanced { level });
    }

    let name = cell[..open].trim();
    if name.is_empty() {
        return Err(ParseError::MissingName { level });
    }

    let items: Vec<&str> = cell[open + 1..close]
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect();
    let Some(first) = items.first_chunk::<CATEGORY_SIZE>() else {
        return Err(ParseError::TooFewItems {
            level,
            found: items.len(),
        });
    };

    Ok(Category::new(name, *first, level)?)
}

/// Parse one sheet line into a validated puzzle.
pub fn parse_row(line: &str) -> Result<Puzzle, ParseError> {
    let cells = split_csv_line(line);
    let day_cell = cells.first().map_or("", |cell| cell.trim());
    let day_index = day_cell
        .parse::<u16>()
        .ok()
        .filter(|day| (1..=366).contains(day))
        .ok_or_else(|| ParseError::BadDay(day_cell.to_string()))?;

    let mut categories = Vec::with_capacity(CATEGORY_COUNT);
    for level in Level::ALL {
        let cell = cells
            .get(level.index() + 1)
            .ok_or(ParseError::MissingCell(level))?;
        categories.push(parse_category_cell(cell, level)?);
    }
    let Ok(categories) = <[Category; CATEGORY_COUNT]>::try_from(categories) else {
        return Err(ParseError::MissingCell(Level::Four));
    };

    Ok(Puzzle::new(categories, day_index)?)
}

/// Every valid row of the sheet, in sheet order. Invalid rows (including a
/// header) are logged and skipped.
#[must_use]
pub fn parse_sheet(text: &str) -> Vec<Puzzle> {
    let mut puzzles = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match parse_row(line) {
            Ok(puzzle) => puzzles.push(puzzle),
            Err(e) => debug!(line = index + 1, "Dropping sheet row: {e}"),
        }
    }
    puzzles
}

/// Today's puzzle: the row for `day_of_year`, or a uniformly random valid row
/// when the sheet has no entry for today.
pub fn select_daily(puzzles: Vec<Puzzle>, day_of_year: u16) -> Result<Puzzle, SourceError> {
    select_daily_with(puzzles, day_of_year, |len| rand::random_range(0..len))
}

/// [`select_daily`] with the fallback pick supplied by the caller.
/// `pick` receives the number of rows and must return an index below it.
pub fn select_daily_with(
    mut puzzles: Vec<Puzzle>,
    day_of_year: u16,
    pick: impl FnOnce(usize) -> usize,
) -> Result<Puzzle, SourceError> {
    if puzzles.is_empty() {
        return Err(SourceError::NoPuzzleAvailable);
    }
    if let Some(position) = puzzles.iter().position(|p| p.day_index() == day_of_year) {
        return Ok(puzzles.swap_remove(position));
    }
    let index = pick(puzzles.len()).min(puzzles.len() - 1);
    debug!(
        day_of_year,
        fallback_day = puzzles[index].day_index(),
        "No sheet row for today, using fallback"
    );
    Ok(puzzles.swap_remove(index))
}
