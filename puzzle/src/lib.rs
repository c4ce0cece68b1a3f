//! Daily puzzle retrieval.
//!
//! - [`sheet`]: the tabular source format and day selection
//! - [`feed`]: HTTP sheet, JSON endpoint and local file feeds
//! - [`source`]: the memoizing, request-coalescing [`PuzzleSource`]
//! - [`api`]: the JSON endpoint adapter

pub mod api;
mod error;
pub mod feed;
pub mod sheet;
pub mod source;

pub use api::{ApiResponse, respond};
pub use error::{FetchError, SourceError};
pub use feed::{ApiFeed, FileFeed, PuzzleFeed, SheetFeed};
pub use sheet::{ParseError, parse_sheet, select_daily};
pub use source::PuzzleSource;
